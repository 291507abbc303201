// Paragraf Core Library
//
// Turns the text of PDF statutes, minutes and reading material into one
// record per section, with the level-1 and level-2 headings it belongs to.
// Main interface is DocumentProcessor: input path -> config -> text -> records.

pub mod types;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod cache;
pub mod config;
pub mod rules;
pub mod storage;
pub mod output;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::Error;
pub use preprocessors::{BackendKind, PdfPreprocessor, Preprocessor};
pub use processor::{DocumentJob, DocumentProcessor, StepProfiler};
pub use config::{BackendPaths, ConfigManager, DocumentConfig, FamilyRules, ProcessorOptions};
pub use rules::parse_text;
pub use output::{writer_for, OutputFormat, RecordWriter, TSV_HEADER};
