use std::io::{self, BufWriter};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chunkdiff::cli::log_level;
use chunkdiff::{build_options, run_chunkdiff, Args};

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors.
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    init_tracing(args.verbose);
    debug!(?args, "parsed arguments");

    if !args.file1.exists() || !args.file2.exists() {
        eprintln!("Error: One or both files do not exist.");
        process::exit(1);
    }

    let opts = build_options(&args)?;

    let stdout = io::stdout();
    let sink = BufWriter::new(stdout.lock());
    run_chunkdiff(&args.file1, &args.file2, &opts, sink).with_context(|| {
        format!(
            "comparing {} with {}",
            args.file1.display(),
            args.file2.display()
        )
    })?;

    Ok(())
}
