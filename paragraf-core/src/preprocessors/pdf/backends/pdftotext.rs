//! pdftotext backend
//!
//! Runs Poppler's pdftotext with the `-semantic-layout` extension, which
//! emits `\x01` for bold lines and blank lines between paragraphs.

use super::{executable_available, run_tool, PdfBackend, END_OF_DOCUMENT_SUFFIX};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref RE_ROLE_TAG: Regex = Regex::new(r"\[(TITLE|PAGE-HEADER)\] ").unwrap();
    static ref RE_BLANK_RUN: Regex = Regex::new(r"\n *(\n *)+").unwrap();
}

pub struct PdfToTextBackend {
    executable: PathBuf,
}

impl PdfToTextBackend {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl PdfBackend for PdfToTextBackend {
    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let args = [
            Path::new("-semantic-layout").as_os_str(),
            pdf_path.as_os_str(),
            Path::new("-").as_os_str(),
        ];
        let raw = run_tool(self.name(), &self.executable, args, pdf_path)?;
        Ok(normalize_output(&raw))
    }

    fn name(&self) -> &str {
        "pdftotext"
    }

    fn is_healthy(&self) -> bool {
        executable_available(&self.executable)
    }
}

/// Turn raw pdftotext output into the marked-up text contract.
pub fn normalize_output(raw: &str) -> String {
    // Role tags are attached far too generously (most agenda items come out
    // as [PAGE-HEADER]), so drop them all.
    let text = RE_ROLE_TAG.replace_all(raw, "");

    // Blank line before each page break, then at most one blank line in a row.
    let text = text.replace('\x0c', "\n\x0c");
    let mut text = RE_BLANK_RUN.replace_all(&text, "\n\n").into_owned();

    text.push_str(END_OF_DOCUMENT_SUFFIX);
    text
}
