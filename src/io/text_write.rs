use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::model::{MatchSummary, ServiceKey};

/// Writes generated artifacts below one output directory.
#[derive(Debug, Clone)]
pub struct TextWriter {
    output_dir: PathBuf,
}

impl TextWriter {
    /// Creates the output directory (and parents) if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        info!(dir = %output_dir.display(), "output directory ready");
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes one line per entry with a trailing newline. An empty slice
    /// produces an empty file.
    pub fn write_lines(&self, name: impl AsRef<Path>, lines: &[String]) -> Result<PathBuf> {
        let mut content = lines.join("\n");
        if !lines.is_empty() {
            content.push('\n');
        }
        self.write_document(name, &content)
    }

    /// Writes `text` verbatim.
    pub fn write_document(&self, name: impl AsRef<Path>, text: &str) -> Result<PathBuf> {
        let path = self.resolve(name.as_ref());
        write_file(&path, text)?;
        Ok(path)
    }

    /// Writes the scan summary as pretty-printed JSON.
    pub fn write_report(
        &self,
        name: impl AsRef<Path>,
        summaries: &[MatchSummary],
    ) -> Result<PathBuf> {
        let path = self.resolve(name.as_ref());
        write_report(&path, summaries)?;
        Ok(path)
    }

    fn resolve(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.output_dir.join(name)
        }
    }
}

/// Writes the scan summary as pretty-printed JSON to an arbitrary path.
pub fn write_report(path: &Path, summaries: &[MatchSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    write_file(path, &json)
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    info!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}

/// Sheet names with spaces replaced by underscores, as used in file names and
/// summary section headers.
pub fn safe_sheet_name(sheet: &str) -> String {
    sheet.replace(' ', "_")
}

/// `<sheet>_<id>_script.txt`
pub fn script_file_name(sheet: &str, service: &ServiceKey) -> String {
    format!("{}_{}_script.txt", safe_sheet_name(sheet), service.id())
}

/// `<destination>_<id>_summary.txt`, with path separators in the destination
/// replaced so the file always lands inside the output directory.
pub fn summary_file_name(destination: &str, service: &ServiceKey) -> String {
    let destination = destination.replace(['/', '\\'], "_");
    format!("{destination}_{}_summary.txt", service.id())
}
