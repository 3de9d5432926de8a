use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

use crate::error::Result;
use crate::plan::ChunkDescriptor;

/// Total number of differences across all chunks.
///
/// Increments are relaxed: the value is only read after every worker has
/// been joined.
#[derive(Debug, Default)]
pub struct GlobalCount(AtomicUsize);

impl GlobalCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Rendered result of one chunk, ready to be written as a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    pub chunk: ChunkDescriptor,
    pub count: usize,
    pub text: String,
}

/// Order in which completed chunks reach the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitOrder {
    /// Ascending chunk start, independent of scheduling.
    #[default]
    ChunkStart,
    /// As soon as a chunk completes.
    Completion,
}

/// Single consumer of worker results. Owns the sink and the global count.
pub struct OutputAggregator<W: Write> {
    sink: W,
    total: GlobalCount,
    order: EmitOrder,
    next_start: usize,
    pending: BTreeMap<usize, ChunkOutput>,
    chunks: usize,
}

impl<W: Write> OutputAggregator<W> {
    pub fn new(sink: W, order: EmitOrder) -> Self {
        Self {
            sink,
            total: GlobalCount::new(),
            order,
            next_start: 0,
            pending: BTreeMap::new(),
            chunks: 0,
        }
    }

    pub fn accept(&mut self, output: ChunkOutput) -> Result<()> {
        self.total.add(output.count);
        self.chunks += 1;
        trace!(
            start = output.chunk.start,
            end = output.chunk.end,
            count = output.count,
            "chunk completed"
        );

        match self.order {
            EmitOrder::Completion => self.emit(&output),
            EmitOrder::ChunkStart => {
                self.pending.insert(output.chunk.start, output);
                while let Some(ready) = self.pending.remove(&self.next_start) {
                    self.next_start = ready.chunk.end;
                    self.emit(&ready)?;
                }
                Ok(())
            }
        }
    }

    pub fn total(&self) -> usize {
        self.total.get()
    }

    /// Writes anything still held back and returns the sink with the total.
    pub fn finish(mut self) -> Result<(W, usize)> {
        let leftovers = std::mem::take(&mut self.pending);
        if !leftovers.is_empty() {
            debug!(held = leftovers.len(), "emitting chunks after a gap in the plan");
        }
        for output in leftovers.values() {
            self.emit(output)?;
        }
        self.sink.flush()?;
        debug!(chunks = self.chunks, total = self.total.get(), "aggregation finished");
        let total = self.total.get();
        Ok((self.sink, total))
    }

    fn emit(&mut self, output: &ChunkOutput) -> Result<()> {
        if !output.text.is_empty() {
            self.sink.write_all(output.text.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(start: usize, end: usize, count: usize, text: &str) -> ChunkOutput {
        ChunkOutput {
            chunk: ChunkDescriptor { start, end },
            count,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_reorders_by_chunk_start() {
        let mut agg = OutputAggregator::new(Vec::new(), EmitOrder::ChunkStart);
        agg.accept(output(20, 30, 1, "c\n")).unwrap();
        agg.accept(output(10, 20, 0, "")).unwrap();
        agg.accept(output(0, 10, 2, "a\n")).unwrap();
        let (sink, total) = agg.finish().unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "a\nc\n");
        assert_eq!(total, 3);
    }

    #[test]
    fn test_completion_order_writes_immediately() {
        let mut agg = OutputAggregator::new(Vec::new(), EmitOrder::Completion);
        agg.accept(output(10, 20, 1, "second\n")).unwrap();
        agg.accept(output(0, 10, 1, "first\n")).unwrap();
        assert_eq!(agg.total(), 2);
        let (sink, _) = agg.finish().unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "second\nfirst\n");
    }

    #[test]
    fn test_gap_is_flushed_on_finish() {
        let mut agg = OutputAggregator::new(Vec::new(), EmitOrder::ChunkStart);
        agg.accept(output(5, 10, 1, "late\n")).unwrap();
        let (sink, total) = agg.finish().unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "late\n");
        assert_eq!(total, 1);
    }

    #[test]
    fn test_global_count_from_threads() {
        let count = GlobalCount::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        count.add(1);
                    }
                });
            }
        });
        assert_eq!(count.get(), 4000);
    }
}
