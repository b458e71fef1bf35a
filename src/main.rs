use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use aufex::batch::{extract_batch, ErrorPolicy};
use aufex::{discover, output};

#[derive(Parser)]
#[command(name = "aufex")]
#[command(about = "Extract content-based audio features from every file in a directory")]
struct Args {
    /// Input directory containing audio files (searched recursively)
    #[arg(short, long)]
    directory: PathBuf,

    /// Output table; created with a header, appended to on re-runs
    #[arg(short, long)]
    output: PathBuf,

    /// Number of parallel extraction jobs
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Report progress after each completed file
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    progress: bool,

    /// Keep going when a file fails to decode instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,
}

#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Csv,
    Jsonl,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.directory.is_dir() {
        bail!("`{}` is not a directory", args.directory.display());
    }

    let files = discover::audio_files(&args.directory);
    if files.is_empty() {
        info!("No audio files found. Exiting.");
        return Ok(());
    }
    info!(
        "Found {} audio files under {}",
        files.len(),
        args.directory.display()
    );

    let policy = if args.skip_failed {
        ErrorPolicy::SkipFailed
    } else {
        ErrorPolicy::FailFast
    };
    let report = extract_batch(&files, args.jobs.max(1), args.progress, policy)?;

    match args.format {
        Format::Csv => output::write_csv(&args.output, &report.rows)?,
        Format::Jsonl => output::write_jsonl(&args.output, &report.rows)?,
    }

    if !report.skipped.is_empty() {
        info!(
            "Skipped {} file(s) that failed to decode",
            report.skipped.len()
        );
    }

    Ok(())
}
