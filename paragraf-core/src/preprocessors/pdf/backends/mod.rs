//! PDF Backend trait and backend kinds
//!
//! Defines the interface that all PDF text extraction backends implement.
//! Every backend produces the same marked-up plain text:
//! - `\x0c` at the start of the first line of each new page
//! - `\x01` at the start of each line set in bold face
//! - a blank line between paragraphs
//! - a final `\x0c\x0c` line marking the end of the document
//!
//! This allows the line scanner to be shared across all backends.

pub mod pdfact;
pub mod pdftohtml;
pub mod pdftotext;

pub use pdfact::PdfActBackend;
pub use pdftohtml::PdfToHtmlBackend;
pub use pdftotext::PdfToTextBackend;

use crate::error::Error;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

/// Appended by every backend so the scanner sees an explicit end of document.
pub const END_OF_DOCUMENT_SUFFIX: &str = "\n\x0c\x0c\n";

/// Backend trait for PDF text extraction
pub trait PdfBackend: Send + Sync {
    /// Extract the PDF at `pdf_path` to marked-up plain text
    fn extract_text(&self, pdf_path: &Path) -> Result<String>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;

    /// Check if the backend's executable can be found
    fn is_healthy(&self) -> bool;
}

/// The closed set of extraction tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Poppler's pdftotext with semantic layout: fast, good paragraph info.
    #[default]
    PdfToText,
    /// pdfact: most accurate, about 50 times slower.
    PdfAct,
    /// pdftohtml: fast, bold and page info from HTML tags.
    PdfToHtml,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::PdfToText, Self::PdfAct, Self::PdfToHtml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfToText => "pdftotext",
            Self::PdfAct => "pdfact",
            Self::PdfToHtml => "pdftohtml",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::UnknownBackend(s.to_string()))
    }
}

/// Run an extraction tool and return its stdout.
///
/// Spawn failures and non-zero exit codes become `Error::BackendFailed`.
pub(crate) fn run_tool<I, S>(backend: &str, program: &Path, args: I, pdf_path: &Path) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let failed = |reason: String| Error::BackendFailed {
        backend: backend.to_string(),
        path: pdf_path.display().to_string(),
        reason,
    };

    log::debug!("Running {} for {}", program.display(), pdf_path.display());
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| failed(format!("could not run {}: {e}", program.display())))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!("{} ({})", output.status, stderr.trim())).into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `program` exists: as given if it has a directory part, else on PATH.
pub(crate) fn executable_available(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
