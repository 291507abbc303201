//! Error types for paragraf-core.
//!
//! Library functions return `anyhow::Result`; the variants below are the
//! conditions callers may want to tell apart (via `downcast_ref`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No document family matches the input path.
    #[error("No config found for \"{path}\", add a family for it with --config")]
    NoConfigForPath { path: String },

    /// A pattern in a family definition does not compile.
    #[error("Invalid {field} pattern '{pattern}' in family '{family}': {source}")]
    InvalidPattern {
        family: String,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Backend name not in {pdftotext, pdfact, pdftohtml}.
    #[error("Unknown extraction backend '{0}' (expected pdftotext, pdfact or pdftohtml)")]
    UnknownBackend(String),

    /// Output format name not in {tsv, jsonl}.
    #[error("Unknown output format '{0}' (expected tsv or jsonl)")]
    UnknownFormat(String),

    /// The extraction tool could not be run or exited with an error.
    #[error("{backend} failed for {path}: {reason}")]
    BackendFailed {
        backend: String,
        path: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
