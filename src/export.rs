//! CSV and JSON export of audit results.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::assembler::{assemble, audit_rows, AuditMode, AuditView};
use crate::model::AuditResult;

/// Output format for the audit command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text, csv, or json", s)),
        }
    }
}

const AUDIT_HEADERS: [&str; 4] = ["Status", "ShieldMap", "PropertyName", "Hostnames"];
const PROTECTED_HEADERS: [&str; 3] = ["ShieldMap", "PropertyName", "Hostnames"];
const UNPROTECTED_HEADERS: [&str; 2] = ["PropertyName", "Hostnames"];

/// Render `result` as CSV for `mode`. The header row is always written.
pub fn to_csv(result: &AuditResult, mode: AuditMode) -> Result<String> {
    match assemble(result, mode) {
        AuditView::Audit(_) => write_csv(&AUDIT_HEADERS, &audit_rows(result)),
        AuditView::ProtectedOnly(rows) => write_csv(&PROTECTED_HEADERS, &rows),
        AuditView::UnprotectedOnly(rows) => write_csv(&UNPROTECTED_HEADERS, &rows),
    }
}

/// Render `result` as pretty JSON for `mode`
pub fn to_json(result: &AuditResult, mode: AuditMode) -> Result<String> {
    let json = match assemble(result, mode) {
        AuditView::Audit(report) => serde_json::to_string_pretty(&report),
        AuditView::ProtectedOnly(rows) => serde_json::to_string_pretty(&rows),
        AuditView::UnprotectedOnly(rows) => serde_json::to_string_pretty(&rows),
    };
    json.context("Failed to serialize audit result")
}

fn write_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Failed to write CSV header")?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write `content` to `path` atomically
///
/// Uses tempfile + rename so a crash never leaves a half-written export.
pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent_dir))?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    Ok(())
}
