//! pdfact backend
//!
//! The most accurate of the three tools (paragraphs, bold, page breaks) but
//! also by far the slowest.

use super::{executable_available, run_tool, PdfBackend, END_OF_DOCUMENT_SUFFIX};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct PdfActBackend {
    executable: PathBuf,
}

impl PdfActBackend {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl PdfBackend for PdfActBackend {
    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let args = [
            Path::new("--with-control-characters").as_os_str(),
            pdf_path.as_os_str(),
        ];
        let raw = run_tool(self.name(), &self.executable, args, pdf_path)?;
        Ok(normalize_output(&raw))
    }

    fn name(&self) -> &str {
        "pdfact"
    }

    fn is_healthy(&self) -> bool {
        executable_available(&self.executable)
    }
}

/// Turn raw pdfact output into the marked-up text contract.
///
/// pdfact can emit two form feeds back to back for an empty page; padding
/// each with a space keeps that from reading as the end of the document.
pub fn normalize_output(raw: &str) -> String {
    let mut text = raw.replace('\x0c', "\x0c ");
    text.push_str(END_OF_DOCUMENT_SUFFIX);
    text
}
