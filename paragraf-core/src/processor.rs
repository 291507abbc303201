use crate::cache::{ExtractionCacheKey, ExtractionCacheValue};
use crate::config::{ConfigManager, DocumentConfig, ProcessorOptions};
use crate::preprocessors::{BackendKind, PdfPreprocessor, Preprocessor};
use crate::rules::SectionAccumulator;
use crate::storage::{calculate_pdf_hash, FileStorage, NoOpStorage, TextStorage};
use crate::types::{DocumentMetadata, Record};
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        log::info!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        log::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            log::info!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        log::info!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// One input resolved to everything needed to process it
#[derive(Debug, Clone)]
pub struct DocumentJob {
    pub input: PathBuf,
    pub config: DocumentConfig,
    pub metadata: DocumentMetadata,
    /// Family backend, or the override
    pub backend: BackendKind,
}

impl DocumentJob {
    pub fn new(input: &Path, config: &DocumentConfig, options: &ProcessorOptions) -> Self {
        Self {
            input: input.to_path_buf(),
            config: config.clone(),
            metadata: config.metadata_for(input, &options.path_prefix),
            backend: options.backend_override.unwrap_or(config.backend),
        }
    }
}

pub struct DocumentProcessor {
    configs: ConfigManager,
    options: ProcessorOptions,
    storage: Box<dyn TextStorage + Send + Sync>,
    cache_enabled: bool,
    preprocessors: HashMap<BackendKind, Box<dyn Preprocessor>>,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with file storage when a cache directory is set
    pub fn new(configs: ConfigManager, options: ProcessorOptions) -> Result<Self> {
        let storage: Box<dyn TextStorage + Send + Sync> = match &options.cache_dir {
            Some(dir) if !options.skip_cache => Box::new(FileStorage::new(dir)?),
            _ => Box::new(NoOpStorage::new()),
        };
        let cache_enabled = options.cache_dir.is_some() && !options.skip_cache;
        Ok(Self::new_with_dependencies(configs, options, storage, cache_enabled))
    }

    /// Create DocumentProcessor with full dependency injection
    ///
    /// PDFs are only read and hashed when `cache_enabled` is set.
    pub fn new_with_dependencies(
        configs: ConfigManager,
        options: ProcessorOptions,
        storage: Box<dyn TextStorage + Send + Sync>,
        cache_enabled: bool,
    ) -> Self {
        Self {
            configs,
            options,
            storage,
            cache_enabled,
            preprocessors: HashMap::new(),
        }
    }

    /// Use `preprocessor` for every document whose backend is its backend
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessors.insert(preprocessor.backend(), preprocessor);
        self
    }

    pub fn configs(&self) -> &ConfigManager {
        &self.configs
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Resolve the config of every input before anything is extracted.
    ///
    /// Every unmatched input is logged; the first one is returned as the error.
    pub fn plan(&self, inputs: &[PathBuf]) -> Result<Vec<DocumentJob>> {
        let mut jobs = Vec::with_capacity(inputs.len());
        let mut first_error = None;

        for input in inputs {
            match self.configs.config_for_path(input) {
                Ok(config) => jobs.push(DocumentJob::new(input, config, &self.options)),
                Err(e) => {
                    log::error!("❌ {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(jobs),
        }
    }

    /// Extract the marked-up text of one document, using the cache if enabled
    pub fn extract_text(&mut self, job: &DocumentJob) -> Result<String> {
        self.extract_text_with_profiler(job, &mut StepProfiler::new(false))
    }

    /// Run the section rules over already extracted text
    pub fn parse_extracted_text(&mut self, text: &str, job: &DocumentJob) -> Vec<Record> {
        let preprocessor = self.preprocessor(job.backend);
        let mut accumulator = SectionAccumulator::new(&job.config, &job.metadata);
        for event in preprocessor.scan(text) {
            accumulator.push(event);
        }
        accumulator.finish()
    }

    /// Extract and parse one document
    pub fn process_document(&mut self, job: &DocumentJob) -> Result<Vec<Record>> {
        let mut profiler = StepProfiler::new(self.options.profile);
        log::info!(
            "📄 Processing {} (family {}, backend {})",
            job.input.display(),
            job.config.family,
            job.backend
        );

        let text = self.extract_text_with_profiler(job, &mut profiler)?;
        let records = profiler.time_step("Scan + Accumulate", || self.parse_extracted_text(&text, job));

        profiler.log_summary();
        log::info!("✅ {} records from {}", records.len(), job.input.display());
        Ok(records)
    }

    fn extract_text_with_profiler(&mut self, job: &DocumentJob, profiler: &mut StepProfiler) -> Result<String> {
        let cache_key = if self.cache_enabled {
            let key = profiler.time_step("Cache Key Generation", || {
                let pdf_bytes = fs::read(&job.input)?;
                Ok::<ExtractionCacheKey, anyhow::Error>(ExtractionCacheKey::new(
                    calculate_pdf_hash(&pdf_bytes),
                    job.backend,
                ))
            })?;
            Some(key)
        } else {
            None
        };

        if let Some(key) = &cache_key {
            let cached = profiler.time_step("Cache Lookup", || self.storage.get_extracted_text(key))?;
            if let Some(cached) = cached {
                log::info!("🎯 Cache hit: {} text for {}", job.backend, job.input.display());
                return Ok(cached.text);
            }
        }

        let start = Instant::now();
        let preprocessor = self.preprocessor(job.backend);
        let text = profiler.time_step("Text Extraction", || preprocessor.extract_marked_text(&job.input))?;
        log::debug!("Extracted {} bytes with {}", text.len(), job.backend);

        if let Some(key) = &cache_key {
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let value = ExtractionCacheValue::new(text.clone(), job.backend, elapsed_ms);
            profiler.time_step("Cache Storage", || self.storage.store_extracted_text(key, &value))?;
        }

        Ok(text)
    }

    fn preprocessor(&mut self, kind: BackendKind) -> &dyn Preprocessor {
        let paths = &self.options.backend_paths;
        &**self
            .preprocessors
            .entry(kind)
            .or_insert_with(|| Box::new(PdfPreprocessor::new(kind, paths)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Returns fixed text and counts extractions
    struct CannedPreprocessor {
        text: String,
        calls: Rc<Cell<usize>>,
    }

    impl Preprocessor for CannedPreprocessor {
        fn extract_marked_text(&self, _input: &Path) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.text.clone())
        }

        fn backend(&self) -> BackendKind {
            BackendKind::PdfToText
        }

        fn name(&self) -> &str {
            "CannedPreprocessor"
        }
    }

    const TEXT: &str = "\x01§ 1 Zweck\nDiese Ordnung regelt.\n\n(1) Der Studiengang.\n\x0c\x0c\n";

    fn processor(options: ProcessorOptions, calls: Rc<Cell<usize>>) -> DocumentProcessor {
        DocumentProcessor::new(ConfigManager::new().unwrap(), options)
            .unwrap()
            .with_preprocessor(Box::new(CannedPreprocessor {
                text: TEXT.to_string(),
                calls,
            }))
    }

    #[test]
    fn test_plan_resolves_configs_and_metadata() {
        let processor = processor(ProcessorOptions::default(), Rc::default());
        let jobs = processor
            .plan(&[PathBuf::from("/pdfs/satzungen/2021-03-01 Ordnung.pdf")])
            .unwrap();
        assert_eq!(jobs[0].config.family, "satzungen");
        assert_eq!(jobs[0].backend, BackendKind::PdfToText);
        assert_eq!(jobs[0].metadata.path, "data/2021-03-01 Ordnung.pdf");
        assert_eq!(jobs[0].metadata.title, "Ordnung");
    }

    #[test]
    fn test_plan_fails_if_any_input_is_unmatched() {
        let processor = processor(ProcessorOptions::default(), Rc::default());
        let result = processor.plan(&[
            PathBuf::from("/pdfs/satzungen/a.pdf"),
            PathBuf::from("/pdfs/unknown/b.pdf"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_override_applies_to_every_job() {
        let options = ProcessorOptions {
            backend_override: Some(BackendKind::PdfToHtml),
            ..ProcessorOptions::default()
        };
        let processor = processor(options, Rc::default());
        let jobs = processor.plan(&[PathBuf::from("/pdfs/stuko/a.pdf")]).unwrap();
        assert_eq!(jobs[0].backend, BackendKind::PdfToHtml);
    }

    #[test]
    fn test_process_document_uses_injected_preprocessor() {
        let calls = Rc::new(Cell::new(0));
        let mut processor = processor(ProcessorOptions::default(), calls.clone());
        let jobs = processor.plan(&[PathBuf::from("/pdfs/satzungen/a.pdf")]).unwrap();

        let records = processor.process_document(&jobs[0]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].h2_text, "(1)");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_second_extraction_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_dir = dir.path().join("satzungen");
        std::fs::create_dir_all(&pdf_dir).unwrap();
        let pdf = pdf_dir.join("2020-01-01 Ordnung.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 test").unwrap();

        let calls = Rc::new(Cell::new(0));
        let options = ProcessorOptions {
            cache_dir: Some(dir.path().join("cache")),
            ..ProcessorOptions::default()
        };
        let mut processor = processor(options, calls.clone());
        let jobs = processor.plan(&[pdf]).unwrap();

        let first = processor.extract_text(&jobs[0]).unwrap();
        let second = processor.extract_text(&jobs[0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_skip_cache_always_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Rc::new(Cell::new(0));
        let options = ProcessorOptions {
            cache_dir: Some(dir.path().to_path_buf()),
            skip_cache: true,
            ..ProcessorOptions::default()
        };
        let mut processor = processor(options, calls.clone());
        let jobs = processor.plan(&[PathBuf::from("/pdfs/satzungen/missing.pdf")]).unwrap();

        processor.extract_text(&jobs[0]).unwrap();
        processor.extract_text(&jobs[0]).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_injected_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Box::new(FileStorage::new(dir.path()).unwrap());
        let pdf = dir.path().join("x.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();

        let mut processor = DocumentProcessor::new_with_dependencies(
            ConfigManager::new().unwrap(),
            ProcessorOptions::default(),
            storage,
            true,
        );
        let job = DocumentJob::new(
            &pdf,
            &DocumentConfig::from_rules(&crate::config::FamilyRules::reading()).unwrap(),
            processor.options(),
        );
        let calls = Rc::new(Cell::new(0));
        processor = processor.with_preprocessor(Box::new(CannedPreprocessor {
            text: TEXT.to_string(),
            calls: calls.clone(),
        }));
        processor.extract_text(&job).unwrap();
        processor.extract_text(&job).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_injected_storage_without_cache_never_reads_pdf() {
        let calls = Rc::new(Cell::new(0));
        let mut processor = DocumentProcessor::new_with_dependencies(
            ConfigManager::new().unwrap(),
            ProcessorOptions::default(),
            Box::new(NoOpStorage::new()),
            false,
        )
        .with_preprocessor(Box::new(CannedPreprocessor {
            text: TEXT.to_string(),
            calls: calls.clone(),
        }));
        // The file does not exist, so hashing it would fail
        let jobs = processor.plan(&[PathBuf::from("/pdfs/satzungen/unreadable.pdf")]).unwrap();

        assert_eq!(processor.extract_text(&jobs[0]).unwrap(), TEXT);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_backend_without_injection_is_created_on_demand() {
        let mut processor = DocumentProcessor::new(ConfigManager::new().unwrap(), ProcessorOptions::default()).unwrap();
        assert_eq!(processor.preprocessor(BackendKind::PdfToHtml).backend(), BackendKind::PdfToHtml);
        assert_eq!(processor.preprocessor(BackendKind::PdfToHtml).name(), "PdfPreprocessor");
    }

    #[test]
    fn test_profiler_records_steps_only_when_enabled() {
        let mut off = StepProfiler::new(false);
        assert_eq!(off.time_step("a", || 1), 1);
        assert!(off.timings().is_empty());

        let mut on = StepProfiler::new(true);
        on.time_step("a", || ());
        on.time_step("b", || ());
        let names: Vec<&str> = on.timings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        on.log_summary();
    }
}
