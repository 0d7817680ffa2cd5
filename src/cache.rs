use std::collections::HashMap;

use crate::model::ServiceKey;

/// Action lines already generated for each (sheet, service) pair, so the
/// summary documents reuse them instead of querying the workbook again.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: HashMap<(String, ServiceKey), Vec<String>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sheet: &str, service: &ServiceKey, lines: Vec<String>) {
        self.entries
            .insert((sheet.to_string(), service.clone()), lines);
    }

    pub fn get(&self, sheet: &str, service: &ServiceKey) -> Option<&[String]> {
        self.entries
            .get(&(sheet.to_string(), service.clone()))
            .map(Vec::as_slice)
    }
}
