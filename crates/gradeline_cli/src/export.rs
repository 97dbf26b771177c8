//! Writing report rows as CSV, JSON or a terminal table.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use gradeline::AssignmentReportRow;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Section code fragments that mark an Adelaide section.
const ADELAIDE_MARKERS: [&str; 3] = ["ADL", "ADELAIDE", "Adelaide"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Comma-separated values with a header row (default)
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
    /// Formatted table for the terminal
    Table,
}

impl OutputFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Table => "txt",
        }
    }
}

/// Write `rows` to `output`, or stdout when no path is given.
pub(crate) fn write_rows<T: Serialize>(
    rows: &[T],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            render(rows, format, &mut writer)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), rows = rows.len(), "Wrote report");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render(rows, format, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn render<T: Serialize, W: Write>(
    rows: &[T],
    format: OutputFormat,
    writer: &mut W,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Csv => write_csv(rows, writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, rows)?;
            writeln!(writer)?;
        }
        OutputFormat::Table => writeln!(writer, "{}", render_table(rows)?)?,
    }
    Ok(())
}

/// Serialize `rows` as CSV; column names come from the rows' serde names.
pub(crate) fn write_csv<T: Serialize, W: Write>(rows: &[T], writer: W) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render `rows` as a table, reusing the CSV columns.
pub(crate) fn render_table<T: Serialize>(rows: &[T]) -> Result<String, Box<dyn Error>> {
    if rows.is_empty() {
        return Ok("(no rows)".to_string());
    }

    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let mut builder = Builder::default();
    builder.push_record(reader.headers()?.iter().map(str::to_string));
    for record in reader.records() {
        builder.push_record(record?.iter().map(str::to_string));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    Ok(table.to_string())
}

pub(crate) fn is_adelaide_section(section: &str) -> bool {
    ADELAIDE_MARKERS
        .iter()
        .any(|marker| section.contains(marker))
}

/// Split rows into `(adelaide, perth)` by section code, keeping order.
pub(crate) fn split_by_campus(
    rows: Vec<AssignmentReportRow>,
) -> (Vec<AssignmentReportRow>, Vec<AssignmentReportRow>) {
    rows.into_iter()
        .partition(|row| is_adelaide_section(&row.section))
}

/// File paths for a campus split: `(adelaide, perth)`.
///
/// With an explicit output path the campus is prefixed to its file name.
/// Otherwise names are derived from the account and `stamp`.
pub(crate) fn campus_paths(
    output: Option<&Path>,
    account_name: &str,
    stamp: &str,
    format: OutputFormat,
) -> (PathBuf, PathBuf) {
    match output {
        Some(path) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("assignments_status.{}", format.extension()));
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            (
                dir.join(format!("ADL-{file_name}")),
                dir.join(format!("PERTH-{file_name}")),
            )
        }
        None => {
            let name = account_name.split_whitespace().collect::<Vec<_>>().join("_");
            let ext = format.extension();
            (
                PathBuf::from(format!("ADL-{name}-{stamp}-assignments_status.{ext}")),
                PathBuf::from(format!("PERTH-{name}-{stamp}-assignments_status.{ext}")),
            )
        }
    }
}

/// Local time stamp used in generated file names.
pub(crate) fn file_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}
