use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::aggregate::build_documents;
use crate::cache::ResultCache;
use crate::error::{Result, ToolError};
use crate::format::format_action_lines;
use crate::io::text_write::{TextWriter, script_file_name};
use crate::matcher::RecordMatcher;
use crate::model::{MatchSummary, ServiceRequest};
use crate::normalize::clean_codes;

/// Counts for every (sheet, service) pair plus the action lines generated for
/// the pairs that matched.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub summaries: Vec<MatchSummary>,
    pub cache: ResultCache,
}

impl ScanResult {
    pub fn total_codes(&self) -> usize {
        self.summaries.iter().map(|summary| summary.count).sum()
    }
}

/// Paths written by [`generate`] and the number of action lines they hold.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub scripts: Vec<PathBuf>,
    pub summaries: Vec<PathBuf>,
    pub lines_written: usize,
}

/// Queries every sheet for every service, sheet-major, and renders the action
/// lines of each pair that matched.
#[instrument(
    level = "info",
    skip_all,
    fields(sheets = sheets.len(), services = requests.len())
)]
pub fn scan(matcher: &RecordMatcher<'_>, sheets: &[String], requests: &[ServiceRequest]) -> ScanResult {
    let mut result = ScanResult::default();

    for sheet in sheets {
        for request in requests {
            let codes = matcher.find_codes(sheet, &request.key);
            let count = codes.len();
            if count > 0 {
                let cleaned = clean_codes(&codes);
                let lines = format_action_lines(&cleaned, &request.destination);
                debug!(%sheet, service = %request.key, raw = count, lines = lines.len(), "rendered action lines");
                result.cache.insert(sheet, &request.key, lines);
            }
            result.summaries.push(MatchSummary {
                sheet: sheet.clone(),
                service: request.key.clone(),
                destination: request.destination.clone(),
                count,
            });
        }
    }

    info!(pairs = result.summaries.len(), codes = result.total_codes(), "scan complete");
    result
}

/// Writes one script per matched pair and one summary per matched service.
#[instrument(level = "info", skip_all, fields(output = %writer.output_dir().display()))]
pub fn generate(
    scan: &ScanResult,
    requests: &[ServiceRequest],
    writer: &TextWriter,
) -> Result<GenerationReport> {
    let mut report = GenerationReport::default();

    for summary in scan.summaries.iter().filter(|summary| summary.count > 0) {
        let lines = scan
            .cache
            .get(&summary.sheet, &summary.service)
            .unwrap_or_default();
        let path = writer.write_lines(script_file_name(&summary.sheet, &summary.service), lines)?;
        info!(lines = lines.len(), path = %path.display(), "wrote script");
        report.lines_written += lines.len();
        report.scripts.push(path);
    }

    for document in build_documents(&scan.summaries, requests, &scan.cache) {
        let path = writer.write_document(&document.file_name, &document.text)?;
        info!(service = %document.service, path = %path.display(), "wrote service summary");
        report.summaries.push(path);
    }

    Ok(report)
}

/// Resolves a sheet selection against the workbook's sheet list.
///
/// Accepts `all`, or a comma-separated mix of 1-based indices and exact sheet
/// names. Repeated picks collapse onto their first occurrence.
pub fn select_sheets(available: &[String], selection: &str) -> Result<Vec<String>> {
    let selection = selection.trim();
    if selection.eq_ignore_ascii_case("all") {
        return Ok(available.to_vec());
    }

    let mut selected: Vec<String> = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let sheet = if part.chars().all(|ch| ch.is_ascii_digit()) {
            part.parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| available.get(index))
                .ok_or_else(|| {
                    ToolError::InvalidSelection(format!(
                        "sheet index {part} is out of range 1..={}",
                        available.len()
                    ))
                })?
        } else {
            available
                .iter()
                .find(|name| name.as_str() == part)
                .ok_or_else(|| ToolError::InvalidSelection(format!("no sheet named '{part}'")))?
        };
        if !selected.contains(sheet) {
            selected.push(sheet.clone());
        }
    }

    if selected.is_empty() {
        return Err(ToolError::InvalidSelection(
            "select sheets by number (e.g. 1,3), name, or 'all'".to_string(),
        ));
    }
    Ok(selected)
}

/// Fixed-width table shown before anything is generated.
pub fn summary_table(summaries: &[MatchSummary]) -> String {
    let rule = "=".repeat(80);
    let mut table = format!("{rule}\nSummary of results:\n{rule}\n");
    for summary in summaries {
        table.push_str(&format!(
            "Sheet: {:<25} | Service_{:<6} | User: {:<15} | Total: {}\n",
            summary.sheet,
            summary.service.id(),
            summary.destination,
            summary.count
        ));
    }
    table.push_str(&rule);
    table.push('\n');
    table
}
