use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{ArgAction, Parser};

use crate::aggregate::EmitOrder;
use crate::bytes::ByteDiffConfig;
use crate::diff::{LineDiffConfig, PlanExtent, DEFAULT_CHUNK_SIZE};
use crate::source::LoadStrategy;
use crate::utils::parse_size;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// First file (A)
    pub file1: PathBuf,

    /// Second file (B)
    pub file2: PathBuf,

    /// Lines per chunk handed to a worker
    #[arg(short, long, env = "CHUNKDIFF_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Maximum number of worker threads (0 = one per CPU)
    #[arg(short = 'j', long, env = "CHUNKDIFF_MAX_WORKERS", default_value_t = 0)]
    pub max_workers: usize,

    /// Compare byte by byte instead of line by line
    #[arg(long)]
    pub bytes: bool,

    /// Minimum byte chunk in byte mode (e.g., 1MiB, 65536)
    #[arg(long, env = "CHUNKDIFF_BYTE_CHUNK_SIZE", default_value = "1MiB")]
    pub byte_chunk_size: String,

    /// Also report trailing lines that only exist in the second file
    #[arg(long)]
    pub include_trailing: bool,

    /// Print chunks as soon as they complete instead of in line order
    #[arg(long)]
    pub unordered: bool,

    /// Read files into memory instead of memory-mapping them
    #[arg(long)]
    pub no_mmap: bool,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Lines,
    Bytes,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub mode: Mode,
    pub load: LoadStrategy,
    pub lines: LineDiffConfig,
    pub bytes: ByteDiffConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            load: LoadStrategy::default(),
            lines: LineDiffConfig::default(),
            bytes: ByteDiffConfig::default(),
        }
    }
}

pub fn build_options(args: &Args) -> Result<Options> {
    ensure!(args.chunk_size > 0, "chunk size must be greater than zero");

    let min_byte_chunk = parse_size(&args.byte_chunk_size);
    ensure!(
        min_byte_chunk > 0,
        "invalid byte chunk size: {}",
        args.byte_chunk_size
    );

    let max_workers = if args.max_workers == 0 {
        num_cpus::get()
    } else {
        args.max_workers
    };

    Ok(Options {
        mode: if args.bytes { Mode::Bytes } else { Mode::Lines },
        load: if args.no_mmap {
            LoadStrategy::Read
        } else {
            LoadStrategy::Mmap
        },
        lines: LineDiffConfig {
            chunk_size: args.chunk_size,
            max_workers,
            order: if args.unordered {
                EmitOrder::Completion
            } else {
                EmitOrder::ChunkStart
            },
            extent: if args.include_trailing {
                PlanExtent::Longest
            } else {
                PlanExtent::FirstFile
            },
        },
        bytes: ByteDiffConfig {
            min_chunk: usize::try_from(min_byte_chunk).unwrap_or(usize::MAX),
            max_workers,
        },
    })
}

/// Log filter for a `-v` count. `RUST_LOG` takes precedence.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
