// Preprocessor abstraction for document processing
//
// This module defines the boundary between text extraction (PDF -> marked-up
// text) and structure recovery (marked-up text -> records). Everything after
// this point works with scan events and is backend-agnostic.

use crate::preprocessors::pdf::BackendKind;
use crate::rules::scanner::LineScanner;
use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts documents to scan events
///
/// The preprocessing happens in two clear steps:
/// 1. Document -> marked-up text (`\x0c` page breaks, `\x01` bold lines,
///    blank lines between paragraphs, `\x0c\x0c` at the end)
/// 2. Marked-up text -> scan events
pub trait Preprocessor {
    /// Step 1: Extract the document to marked-up text
    fn extract_marked_text(&self, input: &Path) -> Result<String>;

    /// Step 2: Scan marked-up text line by line
    ///
    /// Default implementation is the shared control-marker scanner.
    fn scan<'a>(&self, text: &'a str) -> LineScanner<'a> {
        LineScanner::new(text)
    }

    /// Which extraction tool produces the text (part of the cache key)
    fn backend(&self) -> BackendKind;

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;
}
