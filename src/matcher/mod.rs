//! Finds the raw codes recorded against a service on one sheet.

pub mod columns;

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::io::excel_read::TabularSource;
use crate::model::ServiceKey;

pub use columns::{ColumnResolver, ColumnRole, ColumnRoles, ContainsAll, ExactName, Pattern};

/// Why a (sheet, service) query produced the codes it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// At least one row matched; unique raw codes in first-seen order.
    /// May be empty when every matched row had a blank code cell.
    Found(Vec<String>),
    SheetUnreadable,
    ColumnNotFound(ColumnRole),
    NoMatch,
}

impl MatchOutcome {
    pub fn into_codes(self) -> Vec<String> {
        match self {
            MatchOutcome::Found(codes) => codes,
            _ => Vec::new(),
        }
    }
}

/// Queries a [`TabularSource`] for service codes. Never mutates the source and
/// never fails: unreadable sheets and missing columns yield no codes.
pub struct RecordMatcher<'a> {
    source: &'a dyn TabularSource,
    roles: ColumnRoles,
}

impl<'a> RecordMatcher<'a> {
    pub fn new(source: &'a dyn TabularSource) -> Self {
        Self::with_roles(source, ColumnRoles::default())
    }

    pub fn with_roles(source: &'a dyn TabularSource, roles: ColumnRoles) -> Self {
        Self { source, roles }
    }

    /// Unique raw codes for `service` on `sheet`, in first-occurrence order.
    pub fn find_codes(&self, sheet: &str, service: &ServiceKey) -> Vec<String> {
        self.match_codes(sheet, service).into_codes()
    }

    #[instrument(level = "debug", skip(self, service), fields(service = %service.canonical()))]
    pub fn match_codes(&self, sheet: &str, service: &ServiceKey) -> MatchOutcome {
        let table = match self.source.parse_sheet(sheet) {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, "unable to read sheet");
                return MatchOutcome::SheetUnreadable;
            }
        };

        let Some(id_column) = self.resolve(&table.columns, ColumnRole::Identifier, sheet) else {
            return MatchOutcome::ColumnNotFound(ColumnRole::Identifier);
        };

        let matching: Vec<&Vec<String>> = table
            .rows
            .iter()
            .filter(|row| service.matches(table.cell(row, id_column)))
            .collect();
        if matching.is_empty() {
            debug!("no rows matched");
            return MatchOutcome::NoMatch;
        }

        let Some(code_column) = self.resolve(&table.columns, ColumnRole::Code, sheet) else {
            return MatchOutcome::ColumnNotFound(ColumnRole::Code);
        };

        let mut seen = HashSet::new();
        let codes: Vec<String> = matching
            .into_iter()
            .map(|row| table.cell(row, code_column).trim())
            .filter(|code| !code.is_empty() && seen.insert(*code))
            .map(str::to_string)
            .collect();

        info!(
            count = codes.len(),
            "found {} raw code(s) for {} in sheet={sheet}",
            codes.len(),
            service.canonical()
        );
        MatchOutcome::Found(codes)
    }

    fn resolve(&self, columns: &[String], role: ColumnRole, sheet: &str) -> Option<usize> {
        let resolver = self.roles.resolver(role);
        let position = resolver.resolve(columns);
        if position.is_none() {
            warn!(%sheet, %role, "sheet has no {resolver}");
        }
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::excel_read::MemoryWorkbook;

    fn key(raw: &str) -> ServiceKey {
        ServiceKey::parse(raw).unwrap()
    }

    fn region_workbook() -> MemoryWorkbook {
        MemoryWorkbook::new().with_sheet(
            "Region1",
            &["Name", "Service_ID", "Sub-Identifier"],
            &[
                &["a", "Service_1056", "27-84?0001402"],
                &["b", "service_1056", "27-84?0001402"],
                &["c", "SERVICE_1056 ", " 555 "],
                &["d", "service_2000", "999"],
                &["e", "service_1056", ""],
                &["f", "service_10567", "777"],
            ],
        )
    }

    #[test]
    fn matches_case_insensitively_and_dedups_in_order() {
        let workbook = region_workbook();
        let matcher = RecordMatcher::new(&workbook);
        assert_eq!(
            matcher.find_codes("Region1", &key("1056")),
            vec!["27-84?0001402", "555"]
        );
        assert_eq!(matcher.find_codes("Region1", &key("Service_2000")), vec!["999"]);
    }

    #[test]
    fn zero_matches_is_no_match() {
        let workbook = region_workbook();
        let matcher = RecordMatcher::new(&workbook);
        assert_eq!(
            matcher.match_codes("Region1", &key("9999")),
            MatchOutcome::NoMatch
        );
    }

    #[test]
    fn missing_columns_and_unreadable_sheets_yield_nothing() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("NoId", &["sub identifier"], &[&["1"]])
            .with_sheet("NoCode", &["service id", "code"], &[&["service_1", "1"]])
            .with_unreadable_sheet("Broken", "bad zip");
        let matcher = RecordMatcher::new(&workbook);
        let service = key("1");

        assert_eq!(
            matcher.match_codes("NoId", &service),
            MatchOutcome::ColumnNotFound(ColumnRole::Identifier)
        );
        assert_eq!(
            matcher.match_codes("NoCode", &service),
            MatchOutcome::ColumnNotFound(ColumnRole::Code)
        );
        assert_eq!(
            matcher.match_codes("Broken", &service),
            MatchOutcome::SheetUnreadable
        );
        assert!(matcher.find_codes("Missing", &service).is_empty());
    }

    #[test]
    fn custom_roles_replace_header_heuristics() {
        let workbook = MemoryWorkbook::new().with_sheet(
            "Custom",
            &["svc", "msisdn"],
            &[&["service_7", "123"]],
        );
        let roles = ColumnRoles {
            identifier: Box::new(ExactName::new("SVC")),
            code: Box::new(Pattern::new("^msi").unwrap()),
        };
        let matcher = RecordMatcher::with_roles(&workbook, roles);
        assert_eq!(matcher.find_codes("Custom", &key("7")), vec!["123"]);
    }
}
