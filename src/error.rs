use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads a workbook, matches service records, or writes artifacts.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON scan report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The workbook could not be opened at all. Fatal for the whole run.
    #[error("cannot open workbook {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A single sheet could not be parsed. Callers treat it as zero matches.
    #[error("sheet '{sheet}' is unreadable: {reason}")]
    SheetUnreadable { sheet: String, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a sheet selection cannot be resolved against the workbook.
    #[error("invalid sheet selection: {0}")]
    InvalidSelection(String),

    /// Raised when a service argument is malformed.
    #[error("invalid service argument: {0}")]
    InvalidService(String),

    /// Raised when a column pattern override is not a valid regex.
    #[error("invalid column pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
