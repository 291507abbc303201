//! pdftohtml backend
//!
//! pdftohtml is about as fast as pdftotext and reports bold text, page
//! anchors and line breaks as HTML tags, which are rewritten into the
//! control markers here.

use super::{executable_available, run_tool, PdfBackend, END_OF_DOCUMENT_SUFFIX};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    // Body content after the first page anchor; later anchors become page
    // breaks.
    static ref RE_BODY: Regex =
        Regex::new(r"(?s)^.*<body[^>]*>.?<a name=1></a>(.*)</body>.*$").unwrap();
    static ref RE_BREAK: Regex = Regex::new(r"<br/>\n?").unwrap();
    static ref RE_PAGE_ANCHOR: Regex = Regex::new(r"(?m)^<a name=\d+></a>").unwrap();
    static ref RE_BOLD_START: Regex = Regex::new("(?m)^(\x0c?)<b>").unwrap();
    static ref RE_BREAK_ONLY_LINE: Regex = Regex::new(r"(?m)^\s*<br/>\s*$").unwrap();
    static ref RE_TAG: Regex = Regex::new(r"</?[^>]+/?>").unwrap();
    static ref RE_NUMERIC_ENTITY: Regex = Regex::new(r"&#\d+;").unwrap();
}

pub struct PdfToHtmlBackend {
    executable: PathBuf,
}

impl PdfToHtmlBackend {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl PdfBackend for PdfToHtmlBackend {
    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let args = [
            Path::new("-i").as_os_str(),
            Path::new("-stdout").as_os_str(),
            pdf_path.as_os_str(),
        ];
        let raw = run_tool(self.name(), &self.executable, args, pdf_path)?;
        Ok(normalize_output(&raw))
    }

    fn name(&self) -> &str {
        "pdftohtml"
    }

    fn is_healthy(&self) -> bool {
        executable_available(&self.executable)
    }
}

/// Turn raw pdftohtml output into the marked-up text contract.
pub fn normalize_output(raw: &str) -> String {
    let text = RE_BODY.replace(raw, "$1");
    let text = RE_BREAK.replace_all(&text, "<br/>\n");
    let text = RE_PAGE_ANCHOR.replace_all(&text, "\x0c");
    let text = RE_BOLD_START.replace_all(&text, "${1}\x01");
    let text = RE_BREAK_ONLY_LINE.replace_all(&text, "");
    let text = RE_TAG.replace_all(&text, "");
    // Entities like &#160; only ever stand for some kind of space here.
    let mut text = RE_NUMERIC_ENTITY.replace_all(&text, " ").into_owned();

    text.push_str(END_OF_DOCUMENT_SUFFIX);
    text
}
