//! Output rendering for match results
//!
//! This module writes the aggregated matches in the supported formats to any
//! writer, so the binary can target stdout and tests can target a buffer.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::core::{MatchResult, MatchResults};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable block per change (default)
    #[default]
    Text,
    /// One JSON object per change per line
    Json,
    /// One line per matched file
    Compact,
}

/// Write every result in `format`.
pub fn render<W: Write>(results: &MatchResults, format: OutputFormat, writer: &mut W) -> Result<()> {
    for result in results.values() {
        match format {
            OutputFormat::Text => write_text(result, writer)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(result)?)?,
            OutputFormat::Compact => write_compact(result, writer)?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// Render results into a string
pub fn render_to_string(results: &MatchResults, format: OutputFormat) -> Result<String> {
    let mut buf = Vec::new();
    render(results, format, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn write_text<W: Write>(result: &MatchResult, writer: &mut W) -> Result<()> {
    let summary = &result.summary;
    writeln!(writer, "Change-Id: {} ({})", summary.id, summary.url)?;
    writeln!(writer)?;
    writeln!(writer, "    {}", summary.subject)?;
    writeln!(writer)?;

    for m in &result.matches {
        writeln!(writer, "    {} {}", m.kind, m.path)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_compact<W: Write>(result: &MatchResult, writer: &mut W) -> Result<()> {
    for m in &result.matches {
        writeln!(writer, "{} {} {}", result.summary.id, m.kind, m.path)?;
    }
    Ok(())
}
