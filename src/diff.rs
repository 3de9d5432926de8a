use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crossbeam::channel::bounded;
use tracing::{debug, info, trace};

use crate::aggregate::{ChunkOutput, EmitOrder, OutputAggregator};
use crate::bytes::{run_byte_diff, ByteOutcome};
use crate::cli::{Mode, Options};
use crate::error::{Error, Result};
use crate::lines::LineIndex;
use crate::plan::{assign_buckets, plan_chunks, ChunkDescriptor};
use crate::report::{DiffKind, DiffRecord, Renderer};
use crate::source::SourceBuffer;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Which line range the chunk plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanExtent {
    /// Lines of the first file only. Trailing lines that exist only in the
    /// second file are never visited.
    #[default]
    FirstFile,
    /// `max(len(A), len(B))`, so trailing lines of either file are reported.
    Longest,
}

#[derive(Debug, Clone)]
pub struct LineDiffConfig {
    pub chunk_size: usize,
    pub max_workers: usize,
    pub order: EmitOrder,
    pub extent: PlanExtent,
}

impl Default for LineDiffConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_workers: num_cpus::get(),
            order: EmitOrder::default(),
            extent: PlanExtent::default(),
        }
    }
}

/// Differences found by one worker in one chunk, in ascending line order.
#[derive(Debug)]
pub struct ChunkReport<'a> {
    pub chunk: ChunkDescriptor,
    pub records: Vec<DiffRecord<'a>>,
    pub count: usize,
}

impl ChunkReport<'_> {
    pub fn render(&self, renderer: &Renderer) -> ChunkOutput {
        ChunkOutput {
            chunk: self.chunk,
            count: self.count,
            text: renderer.render_all(&self.records),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDiffSummary {
    pub differences: usize,
    pub chunks: usize,
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Lines(LineDiffSummary),
    Bytes(ByteOutcome),
}

/// Compares line `j` of `first` with line `j` of `second` for every `j` in
/// `chunk`. Each differing index counts once.
pub fn compare_chunk<'a>(
    chunk: ChunkDescriptor,
    first: &LineIndex<'a>,
    second: &LineIndex<'a>,
) -> Result<ChunkReport<'a>> {
    let mut records = Vec::new();

    for j in chunk.start..chunk.end {
        let record = if j >= second.len() {
            let line = first.line(j).ok_or(Error::SpanOutOfBounds { line: j + 1 })?;
            DiffRecord {
                line_number: j + 1,
                kind: DiffKind::Addition,
                first: Some(line),
                second: None,
            }
        } else if j >= first.len() {
            let line = second.line(j).ok_or(Error::SpanOutOfBounds { line: j + 1 })?;
            DiffRecord {
                line_number: j + 1,
                kind: DiffKind::Deletion,
                first: None,
                second: Some(line),
            }
        } else {
            let a = first.line(j).ok_or(Error::SpanOutOfBounds { line: j + 1 })?;
            let b = second.line(j).ok_or(Error::SpanOutOfBounds { line: j + 1 })?;
            if a == b {
                continue;
            }
            DiffRecord {
                line_number: j + 1,
                kind: DiffKind::Modification,
                first: Some(a),
                second: Some(b),
            }
        };
        records.push(record);
    }

    let count = records.len();
    Ok(ChunkReport {
        chunk,
        records,
        count,
    })
}

/// Runs the positional line diff over a bounded worker pool and writes the
/// report, followed by the `Total differences` line, to `sink`. Nothing is
/// written to `sink` unless every chunk succeeds.
pub fn run_line_diff<W: Write>(
    first: &LineIndex<'_>,
    second: &LineIndex<'_>,
    config: &LineDiffConfig,
    sink: W,
) -> Result<LineDiffSummary> {
    let start_time = Instant::now();
    let total_units = match config.extent {
        PlanExtent::FirstFile => first.len(),
        PlanExtent::Longest => first.len().max(second.len()),
    };
    let chunks = plan_chunks(total_units, config.chunk_size);
    let chunk_count = chunks.len();
    let buckets = assign_buckets(&chunks, config.max_workers);
    let workers = buckets.len();
    debug!(total_units, chunk_count, workers, "planned line diff");

    let renderer = Renderer::new(first.len().max(second.len()));
    let (mut sink, differences) = run_pool(buckets, config.order, sink, |chunk| {
        compare_chunk(chunk, first, second).map(|report| report.render(&renderer))
    })?;
    writeln!(sink, "Total differences: {differences}")?;
    sink.flush()?;

    info!(
        differences,
        chunks = chunk_count,
        workers,
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "comparison completed"
    );
    Ok(LineDiffSummary {
        differences,
        chunks: chunk_count,
        workers,
    })
}

/// One scoped thread per bucket, a bounded result channel and a single
/// aggregator. The report is collected in memory and copied to `sink` only
/// after the channel drained without an error or a panic.
fn run_pool<W, F>(
    buckets: Vec<Vec<ChunkDescriptor>>,
    order: EmitOrder,
    mut sink: W,
    work: F,
) -> Result<(W, usize)>
where
    W: Write,
    F: Fn(ChunkDescriptor) -> Result<ChunkOutput> + Sync,
{
    let mut aggregator = OutputAggregator::new(Vec::new(), order);
    let (result_tx, result_rx) = bounded::<Result<ChunkOutput>>(buckets.len().max(1) * 2);
    let work = &work;

    let drained = crossbeam::thread::scope(|s| {
        for (worker_id, bucket) in buckets.into_iter().enumerate() {
            let result_tx = result_tx.clone();
            s.spawn(move |_| {
                for chunk in bucket {
                    let outcome = work(chunk).map_err(|e| Error::WorkerFailed {
                        chunk,
                        message: e.to_string(),
                    });
                    let failed = outcome.is_err();
                    // A closed channel means the aggregator gave up.
                    if result_tx.send(outcome).is_err() || failed {
                        break;
                    }
                }
                trace!(worker_id, "worker done");
            });
        }
        drop(result_tx);

        // Dropping the receiver on an early return unblocks the workers.
        for outcome in result_rx {
            aggregator.accept(outcome?)?;
        }
        Ok::<_, Error>(())
    })
    .map_err(|_| Error::WorkerPanicked)?;
    drained?;

    let (report, differences) = aggregator.finish()?;
    sink.write_all(&report)?;
    Ok((sink, differences))
}

/// Loads both files and runs the comparison selected by `opts`.
pub fn run_chunkdiff<W: Write>(
    a_path: &Path,
    b_path: &Path,
    opts: &Options,
    sink: W,
) -> Result<Outcome> {
    match opts.mode {
        Mode::Bytes => {
            run_byte_diff(a_path, b_path, opts.load, &opts.bytes, sink).map(Outcome::Bytes)
        }
        Mode::Lines => {
            let buffer_a = SourceBuffer::open(a_path, opts.load)?;
            let buffer_b = SourceBuffer::open(b_path, opts.load)?;
            let first = LineIndex::build(&buffer_a);
            let second = LineIndex::build(&buffer_b);
            info!(
                a = %buffer_a.path().display(),
                b = %buffer_b.path().display(),
                lines_a = first.len(),
                lines_b = second.len(),
                mapped = buffer_a.is_mapped(),
                "indexed inputs"
            );
            run_line_diff(&first, &second, &opts.lines, sink).map(Outcome::Lines)
        }
    }
}
