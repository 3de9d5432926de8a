use std::fs::{self, File};
use std::io::Read;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

/// How the bytes of an input file are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    #[default]
    Mmap,
    Read,
}

#[derive(Debug)]
enum Storage {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// Immutable raw content of one input file.
#[derive(Debug)]
pub struct SourceBuffer {
    path: PathBuf,
    storage: Storage,
}

impl SourceBuffer {
    pub fn open(path: &Path, strategy: LoadStrategy) -> Result<Self> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();

        // Mapping an empty file fails on some platforms.
        let storage = if size == 0 {
            Storage::Owned(Vec::new())
        } else {
            match strategy {
                LoadStrategy::Mmap => {
                    let map = unsafe { Mmap::map(&file) }.map_err(io_err)?;
                    Storage::Mapped(map)
                }
                LoadStrategy::Read => {
                    let capacity = usize::try_from(size).map_err(|_| Error::Allocation {
                        path: path.to_path_buf(),
                        size,
                    })?;
                    let mut bytes = Vec::new();
                    bytes
                        .try_reserve_exact(capacity)
                        .map_err(|_| Error::Allocation {
                            path: path.to_path_buf(),
                            size,
                        })?;
                    file.read_to_end(&mut bytes).map_err(io_err)?;
                    Storage::Owned(bytes)
                }
            }
        };

        debug!(path = %path.display(), size, ?strategy, "loaded source buffer");
        Ok(Self {
            path: path.to_path_buf(),
            storage,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Mapped(map) => &map[..],
            Storage::Owned(bytes) => &bytes[..],
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped(_))
    }
}

impl Deref for SourceBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Size of a file on disk, used to short-circuit the byte mode.
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_mmap_and_read_agree() {
        let file = temp_with(b"alpha\nbeta\n");
        let mapped = SourceBuffer::open(file.path(), LoadStrategy::Mmap).unwrap();
        let read = SourceBuffer::open(file.path(), LoadStrategy::Read).unwrap();
        assert!(mapped.is_mapped());
        assert!(!read.is_mapped());
        assert_eq!(mapped.as_bytes(), read.as_bytes());
        assert_eq!(&*mapped, b"alpha\nbeta\n");
    }

    #[test]
    fn test_empty_file_is_never_mapped() {
        let file = temp_with(b"");
        let buffer = SourceBuffer::open(file.path(), LoadStrategy::Mmap).unwrap();
        assert!(buffer.is_empty());
        assert!(!buffer.is_mapped());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = SourceBuffer::open(&missing, LoadStrategy::Read).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceBuffer::open(dir.path(), LoadStrategy::Read);
        assert!(err.is_err());
    }
}
