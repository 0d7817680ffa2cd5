//! Combines per-sheet action lines into one summary document per service.

use tracing::debug;

use crate::cache::ResultCache;
use crate::io::text_write::{safe_sheet_name, summary_file_name};
use crate::model::{MatchSummary, ServiceKey, ServiceRequest};

/// Placed between consecutive sheet sections of a summary document.
pub const SHEET_SEPARATOR: &str = "*****************************************";
/// Minimum width the destination is padded to in the service header line.
pub const DESTINATION_WIDTH: usize = 12;

/// Sheets that produced at least one code for a service, in the order they
/// were scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    pub service: ServiceKey,
    pub destination: String,
    pub sheets: Vec<String>,
}

/// A rendered summary document and the file name it belongs under.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDocument {
    pub service: ServiceKey,
    pub file_name: String,
    pub text: String,
}

/// Groups scan rows with a non-zero count by service. Services appear in the
/// order their first matching row was seen; rows with `count == 0` are
/// ignored, so a service with no matches anywhere gets no group.
pub fn group_services(summaries: &[MatchSummary], requests: &[ServiceRequest]) -> Vec<ServiceGroup> {
    let mut groups: Vec<ServiceGroup> = Vec::new();

    for summary in summaries.iter().filter(|summary| summary.count > 0) {
        let index = match groups
            .iter()
            .position(|group| group.service == summary.service)
        {
            Some(index) => index,
            None => {
                let destination = requests
                    .iter()
                    .find(|request| request.key == summary.service)
                    .map_or_else(|| summary.destination.clone(), |request| request.destination.clone());
                groups.push(ServiceGroup {
                    service: summary.service.clone(),
                    destination,
                    sheets: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let sheets = &mut groups[index].sheets;
        if !sheets.contains(&summary.sheet) {
            sheets.push(summary.sheet.clone());
        }
    }

    groups
}

/// Renders one group. Sheets missing from the cache still get a header.
pub fn render_document(group: &ServiceGroup, cache: &ResultCache) -> String {
    let destination = &group.destination;
    let mut text = String::new();
    text.push_str(&format!("{}\n\n", destination.to_uppercase()));
    text.push_str(&format!(
        "{destination:<width$} {}\n\n",
        group.service,
        width = DESTINATION_WIDTH
    ));
    text.push_str("OA: \n\n");

    for (index, sheet) in group.sheets.iter().enumerate() {
        text.push_str(&format!("{}_script\n", safe_sheet_name(sheet)));

        match cache.get(sheet, &group.service) {
            Some(lines) if !lines.is_empty() => {
                text.push_str(&lines.join("\n"));
                text.push('\n');
            }
            Some(_) => {}
            None => debug!(%sheet, service = %group.service, "no cached lines for sheet"),
        }

        if index + 1 < group.sheets.len() {
            text.push_str(&format!("\n{SHEET_SEPARATOR}\n\n"));
        }
    }

    text
}

/// One document per service with at least one matched sheet.
pub fn build_documents(
    summaries: &[MatchSummary],
    requests: &[ServiceRequest],
    cache: &ResultCache,
) -> Vec<ServiceDocument> {
    group_services(summaries, requests)
        .into_iter()
        .map(|group| ServiceDocument {
            file_name: summary_file_name(&group.destination, &group.service),
            text: render_document(&group, cache),
            service: group.service,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(sheet: &str, service: &str, count: usize) -> MatchSummary {
        MatchSummary {
            sheet: sheet.to_string(),
            service: ServiceKey::parse(service).unwrap(),
            destination: "cellfsc".to_string(),
            count,
        }
    }

    fn request(arg: &str) -> ServiceRequest {
        ServiceRequest::parse(arg).unwrap()
    }

    #[test]
    fn groups_only_services_with_matches() {
        let summaries = vec![
            summary("A", "1056", 2),
            summary("A", "9999", 0),
            summary("B", "1056", 1),
            summary("B", "9999", 0),
            summary("B", "2000", 3),
        ];
        let requests = vec![request("1056=cellfsc"), request("9999=x"), request("2000=other")];

        let groups = group_services(&summaries, &requests);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].service.id(), "1056");
        assert_eq!(groups[0].sheets, vec!["A", "B"]);
        assert_eq!(groups[1].destination, "other");
        assert_eq!(groups[1].sheets, vec!["B"]);
    }

    #[test]
    fn renders_sections_with_separator_between_only() {
        let key = ServiceKey::parse("1056").unwrap();
        let mut cache = ResultCache::new();
        cache.insert("Sheet A", &key, vec!["line a1".into(), "line a2".into()]);
        cache.insert("B", &key, vec!["line b1".into()]);
        let group = ServiceGroup {
            service: key,
            destination: "cellfsc".to_string(),
            sheets: vec!["Sheet A".to_string(), "B".to_string()],
        };

        let expected = "CELLFSC\n\
                        \n\
                        cellfsc      service_1056\n\
                        \n\
                        OA: \n\
                        \n\
                        Sheet_A_script\n\
                        line a1\n\
                        line a2\n\
                        \n\
                        *****************************************\n\
                        \n\
                        B_script\n\
                        line b1\n";
        assert_eq!(render_document(&group, &cache), expected);
    }

    #[test]
    fn uncached_sheet_keeps_its_header() {
        let group = ServiceGroup {
            service: ServiceKey::parse("7").unwrap(),
            destination: "a_long_destination".to_string(),
            sheets: vec!["Only".to_string()],
        };
        let text = render_document(&group, &ResultCache::new());
        assert!(text.contains("a_long_destination service_7\n"));
        assert!(text.ends_with("OA: \n\nOnly_script\n"));
        assert!(!text.contains(SHEET_SEPARATOR));
    }

    #[test]
    fn all_zero_services_produce_no_document() {
        let summaries = vec![summary("A", "9999", 0), summary("B", "9999", 0)];
        let requests = vec![request("9999=nobody")];
        assert!(build_documents(&summaries, &requests, &ResultCache::new()).is_empty());
    }
}
