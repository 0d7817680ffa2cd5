//! Core library for the service-scripts command line application.
//!
//! The pipeline reads a multi-sheet workbook through [`io::excel_read`], finds
//! the codes recorded against each requested service with [`matcher`], cleans
//! them in [`normalize`], renders action lines in [`format`], and combines the
//! per-sheet output into one summary document per service in [`aggregate`].
//! [`pipeline`] ties the steps together and [`io::text_write`] puts the results
//! on disk.

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod format;
pub mod io;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use error::{Result, ToolError};
