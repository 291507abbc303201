//! Document Preprocessors
//!
//! This module provides the extraction layer that turns a PDF into the
//! marked-up plain text consumed by the section rules.
//!
//! ## Architecture
//!
//! ```text
//! PDF file
//!     ↓
//! [PdfBackend: pdftotext | pdfact | pdftohtml]
//!     ↓
//! marked-up text (\x0c, \x01, blank lines, \x0c\x0c)
//!     ↓
//! [LineScanner] → [SectionAccumulator]
//!     ↓
//! Records
//! ```

pub mod pdf;
pub mod preprocessor;

// Re-export main types
pub use pdf::{BackendKind, PdfBackend, PdfBackendImpl, PdfPreprocessor};
pub use preprocessor::Preprocessor;
