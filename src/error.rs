use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::plan::ChunkDescriptor;

/// Failures raised while loading inputs or running a comparison.
#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist.
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },
    /// Opening, reading or mapping an input failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The buffer for an input could not be reserved.
    #[error("cannot allocate {size} bytes for {}", path.display())]
    Allocation { path: PathBuf, size: u64 },
    /// A line index was addressed past its end.
    #[error("line {line} is outside of the line index")]
    SpanOutOfBounds { line: usize },
    /// A worker reported a failure for one chunk.
    #[error("worker failed on lines {}..{}: {message}", chunk.start, chunk.end)]
    WorkerFailed {
        chunk: ChunkDescriptor,
        message: String,
    },
    /// A worker thread panicked before the join.
    #[error("a diff worker panicked")]
    WorkerPanicked,
    /// The byte-mode thread pool could not be started.
    #[error("failed to start the comparison pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
