//! Strategies for deciding which header plays which role in a sheet.
//!
//! Headers reaching a resolver are already normalized (trimmed, lower-case).
//! A resolver returns the position of the first header it accepts.

use std::fmt;

use regex::Regex;

use crate::error::Result;
use crate::io::excel_read::normalize_header;

/// Picks a column out of a sheet's normalized headers.
pub trait ColumnResolver: fmt::Debug + fmt::Display {
    fn resolve(&self, columns: &[String]) -> Option<usize>;
}

/// Accepts the first header containing every needle as a substring.
#[derive(Debug, Clone)]
pub struct ContainsAll {
    needles: Vec<String>,
}

impl ContainsAll {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: needles
                .into_iter()
                .map(|needle| normalize_header(needle.as_ref()))
                .collect(),
        }
    }
}

impl ColumnResolver for ContainsAll {
    fn resolve(&self, columns: &[String]) -> Option<usize> {
        columns.iter().position(|column| {
            self.needles
                .iter()
                .all(|needle| column.contains(needle.as_str()))
        })
    }
}

impl fmt::Display for ContainsAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "header containing {}", self.needles.join(" + "))
    }
}

/// Accepts a header equal to the given name after normalization.
#[derive(Debug, Clone)]
pub struct ExactName {
    name: String,
}

impl ExactName {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_header(name),
        }
    }
}

impl ColumnResolver for ExactName {
    fn resolve(&self, columns: &[String]) -> Option<usize> {
        columns.iter().position(|column| *column == self.name)
    }
}

impl fmt::Display for ExactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "header named '{}'", self.name)
    }
}

/// Accepts the first header the regular expression matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl ColumnResolver for Pattern {
    fn resolve(&self, columns: &[String]) -> Option<usize> {
        columns.iter().position(|column| self.regex.is_match(column))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "header matching /{}/", self.regex.as_str())
    }
}

/// Which of the two columns a resolver is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Identifier,
    Code,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Identifier => write!(f, "service id"),
            ColumnRole::Code => write!(f, "sub-identifier"),
        }
    }
}

/// Resolvers for both roles.
#[derive(Debug)]
pub struct ColumnRoles {
    pub identifier: Box<dyn ColumnResolver>,
    pub code: Box<dyn ColumnResolver>,
}

impl ColumnRoles {
    pub fn resolver(&self, role: ColumnRole) -> &dyn ColumnResolver {
        match role {
            ColumnRole::Identifier => self.identifier.as_ref(),
            ColumnRole::Code => self.code.as_ref(),
        }
    }
}

impl Default for ColumnRoles {
    /// "service" + "id" for the identifier, "sub" + "identifier" for codes.
    fn default() -> Self {
        Self {
            identifier: Box::new(ContainsAll::new(["service", "id"])),
            code: Box::new(ContainsAll::new(["sub", "identifier"])),
        }
    }
}
