//
// lib.rs
// chunkdiff
//
// Library entry that re-exports the loading, planning, comparison and output modules so the binary and the tests share one engine.
//
pub mod aggregate;
pub mod bytes;
pub mod cli;
pub mod diff;
pub mod error;
pub mod lines;
pub mod marker;
pub mod plan;
pub mod report;
pub mod source;
pub mod utils;

pub use aggregate::{ChunkOutput, EmitOrder, GlobalCount, OutputAggregator};
pub use bytes::{run_byte_diff, ByteDiff, ByteDiffConfig, ByteOutcome};
pub use cli::{build_options, Args, Mode, Options};
pub use diff::{
    compare_chunk, run_chunkdiff, run_line_diff, ChunkReport, LineDiffConfig, LineDiffSummary,
    Outcome, PlanExtent,
};
pub use error::{Error, Result};
pub use lines::{LineIndex, LineSpan};
pub use marker::diff_marker;
pub use plan::{assign_buckets, plan_chunks, ChunkDescriptor};
pub use report::{DiffKind, DiffRecord, Renderer};
pub use source::{LoadStrategy, SourceBuffer};
