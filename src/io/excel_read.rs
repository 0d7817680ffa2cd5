use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use tracing::{debug, info};

use crate::error::{Result, ToolError};

/// A parsed sheet: normalized header names plus the data rows beneath them.
///
/// Cells are kept positionally, so `rows[r][c]` belongs to `columns[c]`. Rows
/// may be shorter than the header; missing trailing cells read as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Builds a table, normalizing every header name once.
    pub fn new(sheet_name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns: headers.iter().map(|header| normalize_header(header)).collect(),
            rows,
        }
    }

    /// Value of column `index` in `row`, or `""` when the row is short.
    pub fn cell<'a>(&self, row: &'a [String], index: usize) -> &'a str {
        row.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Lower-cases and trims a header cell.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Read-only access to a multi-sheet workbook.
pub trait TabularSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Parses one sheet. Fails with [`ToolError::SheetUnreadable`] when the
    /// sheet is missing or its contents could not be decoded.
    fn parse_sheet(&self, name: &str) -> Result<SheetTable>;
}

/// Workbook on disk, read through calamine. Any format calamine detects from
/// the extension (xlsx, xlsm, xlsb, xls, ods) is accepted.
///
/// Only the sheet list is read up front; a sheet's cells are decoded each time
/// it is parsed.
pub struct ExcelWorkbook {
    names: Vec<String>,
    reader: RefCell<Sheets<BufReader<File>>>,
}

impl ExcelWorkbook {
    /// Opens the workbook. Failure to open the file is fatal.
    pub fn open(path: &Path) -> Result<Self> {
        let reader =
            open_workbook_auto(path).map_err(|source| ToolError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        let names = reader.sheet_names().to_vec();

        info!(path = %path.display(), sheet_count = names.len(), "loaded workbook");
        Ok(Self {
            names,
            reader: RefCell::new(reader),
        })
    }
}

impl TabularSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn parse_sheet(&self, name: &str) -> Result<SheetTable> {
        if !self.names.iter().any(|sheet| sheet == name) {
            return Err(unreadable(name, "no such sheet"));
        }

        let range = match self.reader.borrow_mut().worksheet_range(name) {
            Some(Ok(range)) => range,
            Some(Err(error)) => return Err(unreadable(name, &error.to_string())),
            None => return Err(unreadable(name, "sheet listed but not present")),
        };
        debug!(sheet = %name, rows = range.height(), "decoded sheet");
        Ok(table_from_range(name, &range))
    }
}

fn table_from_range(name: &str, range: &Range<DataType>) -> SheetTable {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();
    SheetTable::new(name, headers, rows)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn unreadable(sheet: &str, reason: &str) -> ToolError {
    ToolError::SheetUnreadable {
        sheet: sheet.to_string(),
        reason: reason.to_string(),
    }
}

/// Workbook held entirely in memory. Useful when tables come from somewhere
/// other than a file, and for exercising the matcher without fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, std::result::Result<SheetTable, String>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet from raw header names and row values.
    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers = headers.iter().map(|header| header.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.sheets
            .push((name.to_string(), Ok(SheetTable::new(name, headers, rows))));
        self
    }

    /// Appends a sheet that fails to parse with the given reason.
    pub fn with_unreadable_sheet(mut self, name: &str, reason: &str) -> Self {
        self.sheets.push((name.to_string(), Err(reason.to_string())));
        self
    }
}

impl TabularSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn parse_sheet(&self, name: &str) -> Result<SheetTable> {
        match self.sheets.iter().find(|(sheet, _)| sheet == name) {
            Some((_, Ok(table))) => Ok(table.clone()),
            Some((_, Err(reason))) => Err(unreadable(name, reason)),
            None => Err(unreadable(name, "no such sheet")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_normalized_once_at_construction() {
        let table = SheetTable::new(
            "Region1",
            vec!["  Service ID ".to_string(), "SUB-Identifier".to_string()],
            vec![vec!["service_1".to_string()]],
        );
        assert_eq!(table.columns, vec!["service id", "sub-identifier"]);
        assert_eq!(table.cell(&table.rows[0], 1), "");
    }

    #[test]
    fn memory_workbook_reports_unreadable_and_unknown_sheets() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Ok", &["a"], &[&["1"]])
            .with_unreadable_sheet("Broken", "corrupt xml");

        assert_eq!(workbook.sheet_names(), vec!["Ok", "Broken"]);
        assert!(workbook.parse_sheet("Ok").is_ok());
        assert!(matches!(
            workbook.parse_sheet("Broken"),
            Err(ToolError::SheetUnreadable { ref reason, .. }) if reason == "corrupt xml"
        ));
        assert!(matches!(
            workbook.parse_sheet("Missing"),
            Err(ToolError::SheetUnreadable { .. })
        ));
    }

    #[test]
    fn whole_floats_render_without_fraction() {
        assert_eq!(cell_to_string(Some(&DataType::Float(27840001402.0))), "27840001402");
        assert_eq!(cell_to_string(Some(&DataType::Float(1.5))), "1.5");
        assert_eq!(cell_to_string(Some(&DataType::Empty)), "");
    }
}
