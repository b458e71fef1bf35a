//! Tabular persistence of completed batches.
//!
//! CSV keeps the original append-or-create contract: the header row is
//! written exactly once, when the output file is first created; later
//! runs against the same file append data rows only. JSONL writes one
//! self-describing object per row and needs no header.

use crate::audio::COLUMNS;
use crate::batch::BatchRow;
use anyhow::{Context, Result};
use log::info;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_csv(path: &Path, rows: &[BatchRow]) -> Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening output file `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);

    if is_new {
        writeln!(writer, "{}", COLUMNS.join(","))?;
    }
    for row in rows {
        let mut first = true;
        for value in row.features.values() {
            if !first {
                write!(writer, ",")?;
            }
            write!(writer, "{value}")?;
            first = false;
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    info!(
        "{} {} rows to {}",
        if is_new { "Wrote" } else { "Appended" },
        rows.len(),
        path.display()
    );
    Ok(())
}

pub fn write_jsonl(path: &Path, rows: &[BatchRow]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening output file `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);

    for row in rows {
        let line = serde_json::to_string(row)?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    info!("Appended {} rows to {}", rows.len(), path.display());
    Ok(())
}
