use crate::preprocessors::pdf::BackendKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const PARAGRAF_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump when any backend's post-processing of tool output changes
    pub const PROCESSING_VERSION: &str = "1.0.0";
}

/// Extraction cache key (PDF + backend → marked-up text)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExtractionCacheKey {
    pub pdf_hash: String,
    pub backend: BackendKind,
    pub paragraf_version: String,
    pub processing_version: String,
}

impl ExtractionCacheKey {
    pub fn new(pdf_hash: String, backend: BackendKind) -> Self {
        Self {
            pdf_hash,
            backend,
            paragraf_version: versions::PARAGRAF_VERSION.to_string(),
            processing_version: versions::PROCESSING_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.pdf_hash);
        hasher.update(self.backend.as_str());
        hasher.update(&self.paragraf_version);
        hasher.update(&self.processing_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Extraction cache value (text with metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionCacheValue {
    pub text: String,
    pub backend: BackendKind,
    pub created_at: DateTime<Utc>,
    pub extraction_time_ms: u64,
    pub cache_version: String,
}

impl ExtractionCacheValue {
    pub fn new(text: String, backend: BackendKind, extraction_time_ms: u64) -> Self {
        Self {
            text,
            backend,
            created_at: Utc::now(),
            extraction_time_ms,
            cache_version: versions::PARAGRAF_VERSION.to_string(),
        }
    }
}
