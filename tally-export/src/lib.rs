//! tally-export: write a filtered, sorted view of transactions to CSV or JSON.

pub mod csv_export;
pub mod json_export;

use anyhow::{Context, Result, bail};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tally_core::Transaction;

pub use csv_export::write_csv;
pub use json_export::write_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("unknown export format '{other}' (expected csv or json)"),
        }
    }
}

/// Write `view` to any writer in the given format.
pub fn write_view<W: Write>(format: ExportFormat, view: &[Transaction], writer: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(view, writer),
        ExportFormat::Json => write_json(view, writer),
    }
}

/// Create (or truncate) `path` and write `view` into it. Returns the number of rows written.
pub fn export_to_path(format: ExportFormat, view: &[Transaction], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_view(format, view, &mut out).with_context(|| format!("writing {}", path.display()))?;
    out.flush().with_context(|| format!("flushing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = view.len(), %format, "exported view");
    Ok(view.len())
}
