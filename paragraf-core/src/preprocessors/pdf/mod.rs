//! PDF Preprocessor
//!
//! Main preprocessor for PDF documents. Uses one of three pluggable
//! extraction backends to produce marked-up plain text, which the line
//! scanner then turns into scan events.

pub mod backends;

use crate::config::BackendPaths;
use crate::preprocessors::preprocessor::Preprocessor;
use anyhow::Result;
use std::path::Path;

pub use backends::{BackendKind, PdfActBackend, PdfBackend, PdfToHtmlBackend, PdfToTextBackend};

/// Backend enum for runtime backend selection
pub enum PdfBackendImpl {
    PdfToText(PdfToTextBackend),
    PdfAct(PdfActBackend),
    PdfToHtml(PdfToHtmlBackend),
}

impl PdfBackendImpl {
    /// Map a backend kind to its implementation, using the configured
    /// executable locations.
    pub fn for_kind(kind: BackendKind, paths: &BackendPaths) -> Self {
        match kind {
            BackendKind::PdfToText => Self::PdfToText(PdfToTextBackend::new(&paths.pdftotext)),
            BackendKind::PdfAct => Self::PdfAct(PdfActBackend::new(&paths.pdfact)),
            BackendKind::PdfToHtml => Self::PdfToHtml(PdfToHtmlBackend::new(&paths.pdftohtml)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            PdfBackendImpl::PdfToText(_) => BackendKind::PdfToText,
            PdfBackendImpl::PdfAct(_) => BackendKind::PdfAct,
            PdfBackendImpl::PdfToHtml(_) => BackendKind::PdfToHtml,
        }
    }
}

impl PdfBackend for PdfBackendImpl {
    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        match self {
            PdfBackendImpl::PdfToText(backend) => backend.extract_text(pdf_path),
            PdfBackendImpl::PdfAct(backend) => backend.extract_text(pdf_path),
            PdfBackendImpl::PdfToHtml(backend) => backend.extract_text(pdf_path),
        }
    }

    fn name(&self) -> &str {
        match self {
            PdfBackendImpl::PdfToText(backend) => backend.name(),
            PdfBackendImpl::PdfAct(backend) => backend.name(),
            PdfBackendImpl::PdfToHtml(backend) => backend.name(),
        }
    }

    fn is_healthy(&self) -> bool {
        match self {
            PdfBackendImpl::PdfToText(backend) => backend.is_healthy(),
            PdfBackendImpl::PdfAct(backend) => backend.is_healthy(),
            PdfBackendImpl::PdfToHtml(backend) => backend.is_healthy(),
        }
    }
}

/// PDF Preprocessor with pluggable backend
pub struct PdfPreprocessor {
    backend: PdfBackendImpl,
}

impl PdfPreprocessor {
    pub fn new(kind: BackendKind, paths: &BackendPaths) -> Self {
        let backend = PdfBackendImpl::for_kind(kind, paths);
        if !backend.is_healthy() {
            log::warn!("⚠️  {} executable not found, extraction will fail", backend.name());
        }
        Self { backend }
    }
}

impl Preprocessor for PdfPreprocessor {
    fn extract_marked_text(&self, input: &Path) -> Result<String> {
        self.backend.extract_text(input)
    }

    fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }
}
