use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::{Result, ToolError};

/// Prefix every canonical service key carries.
pub const SERVICE_PREFIX: &str = "service_";

/// Identifier of a service in the `service_<id>` scheme.
///
/// Accepts both the bare id (`1056`) and the prefixed form (`Service_1056`).
/// Two keys are equal when their canonical, lower-cased forms are equal, so
/// `1056`, `service_1056` and `SERVICE_1056` all name the same service.
#[derive(Debug, Clone)]
pub struct ServiceKey {
    id: String,
    canonical: String,
}

impl ServiceKey {
    /// Parses user input into a key. Surrounding whitespace is ignored and the
    /// `service_` prefix is recognised case-insensitively.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let id = trimmed
            .get(..SERVICE_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(SERVICE_PREFIX))
            .map_or(trimmed, |_| &trimmed[SERVICE_PREFIX.len()..]);

        if id.is_empty() {
            return Err(ToolError::InvalidService(format!(
                "'{raw}' does not name a service id"
            )));
        }

        Ok(Self {
            id: id.to_string(),
            canonical: format!("{SERVICE_PREFIX}{id}").to_lowercase(),
        })
    }

    /// The bare id as the user wrote it, without the prefix.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lower-cased `service_<id>` form used for row matching.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Exact, case- and whitespace-insensitive comparison against a cell value.
    pub fn matches(&self, cell: &str) -> bool {
        cell.trim().to_lowercase() == self.canonical
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SERVICE_PREFIX}{}", self.id)
    }
}

impl Serialize for ServiceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A service the caller wants scripts for, with the destination username
/// embedded into every generated action line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub key: ServiceKey,
    pub destination: String,
}

impl ServiceRequest {
    /// Builds a request, rejecting blank destinations.
    pub fn new(key: ServiceKey, destination: &str) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(ToolError::InvalidService(format!(
                "destination for {key} cannot be empty"
            )));
        }
        Ok(Self {
            key,
            destination: destination.to_string(),
        })
    }

    /// Parses an `ID=DESTINATION` argument.
    pub fn parse(arg: &str) -> Result<Self> {
        let (id, destination) = arg.split_once('=').ok_or_else(|| {
            ToolError::InvalidService(format!("expected ID=DESTINATION, got '{arg}'"))
        })?;
        Self::new(ServiceKey::parse(id)?, destination)
    }
}

/// Collapses requests naming the same service. The first occurrence keeps its
/// position; the last destination given wins.
pub fn merge_requests(requests: Vec<ServiceRequest>) -> Vec<ServiceRequest> {
    let mut merged: Vec<ServiceRequest> = Vec::with_capacity(requests.len());
    for request in requests {
        match merged.iter_mut().find(|existing| existing.key == request.key) {
            Some(existing) => existing.destination = request.destination,
            None => merged.push(request),
        }
    }
    merged
}

/// Number of raw codes found for one (sheet, service) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub sheet: String,
    pub service: ServiceKey,
    pub destination: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_prefixed_ids_are_the_same_key() {
        let bare = ServiceKey::parse("1056").unwrap();
        let prefixed = ServiceKey::parse("  SERVICE_1056 ").unwrap();
        assert_eq!(bare, prefixed);
        assert_eq!(bare.canonical(), "service_1056");
        assert_eq!(prefixed.id(), "1056");
    }

    #[test]
    fn matching_ignores_case_and_padding_only() {
        let key = ServiceKey::parse("1056").unwrap();
        assert!(key.matches("Service_1056"));
        assert!(key.matches("SERVICE_1056 "));
        assert!(!key.matches("service_10567"));
        assert!(!key.matches("1056"));
    }

    #[test]
    fn empty_ids_and_destinations_are_rejected() {
        assert!(ServiceKey::parse("service_").is_err());
        assert!(ServiceKey::parse("   ").is_err());
        assert!(ServiceRequest::parse("1056=  ").is_err());
        assert!(ServiceRequest::parse("1056").is_err());
    }

    #[test]
    fn merge_keeps_first_position_and_last_destination() {
        let requests = vec![
            ServiceRequest::parse("1056=alpha").unwrap(),
            ServiceRequest::parse("2000=beta").unwrap(),
            ServiceRequest::parse("Service_1056=gamma").unwrap(),
        ];
        let merged = merge_requests(requests);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].key.id(), "1056");
        assert_eq!(merged[0].destination, "gamma");
        assert_eq!(merged[1].destination, "beta");
    }
}
