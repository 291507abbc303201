use crate::cache::{ExtractionCacheKey, ExtractionCacheValue};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage abstraction for caching extraction results
pub trait TextStorage {
    fn get_extracted_text(&self, cache_key: &ExtractionCacheKey) -> Result<Option<ExtractionCacheValue>>;
    fn store_extracted_text(&self, cache_key: &ExtractionCacheKey, cache_value: &ExtractionCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        // Ensure cache directory exists
        fs::create_dir_all(cache_dir.join("extraction"))?;

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    fn extraction_path(&self, cache_key: &ExtractionCacheKey) -> PathBuf {
        self.cache_dir
            .join("extraction")
            .join(format!("{}.json", cache_key.to_cache_hash()))
    }
}

impl TextStorage for FileStorage {
    fn get_extracted_text(&self, cache_key: &ExtractionCacheKey) -> Result<Option<ExtractionCacheValue>> {
        let path = self.extraction_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: ExtractionCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached extraction: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_extracted_text(&self, cache_key: &ExtractionCacheKey, cache_value: &ExtractionCacheValue) -> Result<()> {
        let path = self.extraction_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize extraction: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// SHA-256 of the whole PDF
pub fn calculate_pdf_hash(pdf_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pdf_bytes);
    format!("{:x}", hasher.finalize())
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl TextStorage for NoOpStorage {
    fn get_extracted_text(&self, _cache_key: &ExtractionCacheKey) -> Result<Option<ExtractionCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_extracted_text(&self, _cache_key: &ExtractionCacheKey, _cache_value: &ExtractionCacheValue) -> Result<()> {
        Ok(()) // No-op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessors::pdf::BackendKind;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let key = ExtractionCacheKey::new(calculate_pdf_hash(b"%PDF-1.4"), BackendKind::PdfToHtml);

        assert!(storage.get_extracted_text(&key).unwrap().is_none());

        let value = ExtractionCacheValue::new("\x01§ 1 Zweck\n\x0c\x0c\n".to_string(), BackendKind::PdfToHtml, 12);
        storage.store_extracted_text(&key, &value).unwrap();

        let cached = storage.get_extracted_text(&key).unwrap().unwrap();
        assert_eq!(cached.text, value.text);
        assert_eq!(cached.backend, BackendKind::PdfToHtml);
        assert_eq!(cached.created_at, value.created_at);
    }

    #[test]
    fn test_other_backend_misses() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let hash = calculate_pdf_hash(b"%PDF-1.4");
        let stored = ExtractionCacheKey::new(hash.clone(), BackendKind::PdfToText);
        storage
            .store_extracted_text(&stored, &ExtractionCacheValue::new("x".to_string(), BackendKind::PdfToText, 1))
            .unwrap();

        let other = ExtractionCacheKey::new(hash, BackendKind::PdfAct);
        assert!(storage.get_extracted_text(&other).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let key = ExtractionCacheKey::new("abc".to_string(), BackendKind::PdfToText);
        fs::write(storage.extraction_path(&key), "not json").unwrap();
        assert!(storage.get_extracted_text(&key).is_err());
    }

    #[test]
    fn test_noop_storage_never_hits() {
        let storage = NoOpStorage::new();
        let key = ExtractionCacheKey::new("abc".to_string(), BackendKind::PdfToText);
        storage
            .store_extracted_text(&key, &ExtractionCacheValue::new("x".to_string(), BackendKind::PdfToText, 1))
            .unwrap();
        assert!(storage.get_extracted_text(&key).unwrap().is_none());
    }

    #[test]
    fn test_pdf_hash_covers_whole_file() {
        let mut a = vec![0u8; 4096];
        let b = a.clone();
        a[2048] = 1;
        assert_ne!(calculate_pdf_hash(&a), calculate_pdf_hash(&b));
    }
}
