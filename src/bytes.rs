use std::io::Write;
use std::path::Path;
use std::time::Instant;

use memchr::{memchr, memchr_iter, memrchr};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::aggregate::GlobalCount;
use crate::error::Result;
use crate::plan::plan_chunks;
use crate::source::{file_size, LoadStrategy, SourceBuffer};
use crate::utils::decode_best_effort;

/// Smallest byte chunk handed to one task.
pub const MIN_BYTE_CHUNK: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOutcome {
    /// Sizes differ; nothing was compared.
    SizeMismatch,
    Identical,
    Different { differences: usize },
}

/// First differing byte of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteDiff {
    /// 1-based line in the whole file.
    pub line: usize,
    /// 0-based byte offset in the whole file.
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct ByteDiffConfig {
    /// Smallest chunk handed to one task.
    pub min_chunk: usize,
    /// Threads of the comparison pool, and the most chunks planned.
    pub max_workers: usize,
}

impl Default for ByteDiffConfig {
    fn default() -> Self {
        Self {
            min_chunk: MIN_BYTE_CHUNK,
            max_workers: num_cpus::get(),
        }
    }
}

/// Chunk length for `len` bytes: at least `min_chunk`, otherwise an even
/// split over `workers`, so no more than `workers` chunks are planned.
pub fn byte_chunk_size(len: usize, min_chunk: usize, workers: usize) -> usize {
    min_chunk.max(len.div_ceil(workers.max(1))).max(1)
}

/// Finds the first differing byte of every chunk of two equally sized
/// buffers. Results come back in chunk order.
pub fn find_differences(
    first: &[u8],
    second: &[u8],
    chunk_size: usize,
    count: &GlobalCount,
) -> Vec<ByteDiff> {
    let len = first.len().min(second.len());
    let chunks = plan_chunks(len, chunk_size);

    // Newlines before each chunk, so line numbers are file-absolute.
    let newlines: Vec<usize> = chunks
        .par_iter()
        .map(|c| memchr_iter(b'\n', &first[c.start..c.end]).count())
        .collect();
    let lines_before: Vec<usize> = newlines
        .iter()
        .scan(0, |acc, &n| {
            let before = *acc;
            *acc += n;
            Some(before)
        })
        .collect();

    chunks
        .par_iter()
        .zip(lines_before.par_iter())
        .filter_map(|(chunk, &before)| {
            let range = chunk.start..chunk.end;
            let offset = first[range.clone()]
                .iter()
                .zip(&second[range])
                .position(|(a, b)| a != b)?;
            count.add(1);
            let position = chunk.start + offset;
            let line = before + memchr_iter(b'\n', &first[chunk.start..position]).count() + 1;
            Some(ByteDiff { line, position })
        })
        .collect()
}

/// Line of `data` containing byte `pos`, without its newline.
pub fn enclosing_line(data: &[u8], pos: usize) -> &[u8] {
    let start = memrchr(b'\n', &data[..pos]).map_or(0, |i| i + 1);
    let end = memchr(b'\n', &data[pos..]).map_or(data.len(), |i| pos + i);
    &data[start..end]
}

pub fn write_differences<W: Write>(
    mut sink: W,
    first: &[u8],
    second: &[u8],
    diffs: &[ByteDiff],
) -> Result<()> {
    writeln!(sink, "Total differences: {}", diffs.len())?;
    for diff in diffs {
        writeln!(sink, "Diff at line {}, position {}:", diff.line, diff.position)?;
        writeln!(
            sink,
            "File 1: {}",
            decode_best_effort(enclosing_line(first, diff.position))
        )?;
        writeln!(
            sink,
            "File 2: {}",
            decode_best_effort(enclosing_line(second, diff.position))
        )?;
        writeln!(sink)?;
    }
    Ok(())
}

/// Byte-positional comparison. Files of different size are never read.
pub fn run_byte_diff<W: Write>(
    a_path: &Path,
    b_path: &Path,
    load: LoadStrategy,
    config: &ByteDiffConfig,
    mut sink: W,
) -> Result<ByteOutcome> {
    let start_time = Instant::now();
    let (size_a, size_b) = (file_size(a_path)?, file_size(b_path)?);
    if size_a != size_b {
        debug!(size_a, size_b, "sizes differ, skipping byte comparison");
        writeln!(sink, "Files have different sizes. They are not identical.")?;
        sink.flush()?;
        return Ok(ByteOutcome::SizeMismatch);
    }

    let first = SourceBuffer::open(a_path, load)?;
    let second = SourceBuffer::open(b_path, load)?;
    let workers = config.max_workers.max(1);
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
    let chunk_size = byte_chunk_size(first.len(), config.min_chunk, workers);
    let count = GlobalCount::new();
    let diffs = pool.install(|| find_differences(&first, &second, chunk_size, &count));

    let outcome = if count.get() == 0 {
        writeln!(sink, "Files are identical.")?;
        ByteOutcome::Identical
    } else {
        write_differences(&mut sink, &first, &second, &diffs)?;
        ByteOutcome::Different {
            differences: count.get(),
        }
    };
    sink.flush()?;

    info!(
        bytes = first.len(),
        chunk_size,
        workers,
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "comparison completed"
    );
    Ok(outcome)
}
