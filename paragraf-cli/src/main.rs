use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

// Import from paragraf-core
use paragraf_core::{
    writer_for, BackendKind, BackendPaths, ConfigManager, DocumentProcessor, OutputFormat,
    ProcessorOptions,
};

#[derive(Parser)]
#[command(name = "paragraf")]
#[command(about = "Split PDF statutes and minutes into TSV records, one per section")]
struct Args {
    /// PDF files to process; the path selects the document family
    #[arg(required_unless_present = "show_configs")]
    files: Vec<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "INFO", value_parser = ["ERROR", "INFO", "DEBUG"])]
    log_level: String,

    /// Print the extracted text of each PDF instead of records
    #[arg(long)]
    debug_text: bool,

    /// Use this extraction tool for every file: pdftotext, pdftohtml or pdfact
    #[arg(long)]
    pdftotext_override: Option<BackendKind>,

    /// Family file (YAML) tried before the built-in families; repeatable
    #[arg(short, long)]
    config: Vec<PathBuf>,

    /// Output format: tsv or jsonl
    #[arg(short = 'f', long, default_value = "tsv")]
    format: OutputFormat,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix of the path column
    #[arg(long, default_value = "data/")]
    path_prefix: String,

    /// Cache extracted text in the user cache directory
    #[arg(long)]
    cache: bool,

    /// Cache extracted text in this directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Skip cache and force fresh extraction
    #[arg(long)]
    skip_cache: bool,

    /// Log timings of the pipeline steps
    #[arg(long)]
    profile: bool,

    /// Show the known document families and exit
    #[arg(long)]
    show_configs: bool,

    /// pdftotext executable (needs -semantic-layout support)
    #[arg(long)]
    pdftotext_path: Option<PathBuf>,

    /// pdfact executable
    #[arg(long)]
    pdfact_path: Option<PathBuf>,

    /// pdftohtml executable
    #[arg(long)]
    pdftohtml_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug_text { "debug" } else { args.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_lowercase()))
        .format_timestamp(None)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every document was processed.
fn run(args: &Args) -> Result<bool> {
    let mut configs = ConfigManager::new()?;
    for path in &args.config {
        let count = configs
            .load_config_from_file(path)
            .with_context(|| format!("Failed to load family file {}", path.display()))?;
        log::info!("📋 Loaded {} families from {}", count, path.display());
    }

    if args.show_configs {
        show_configs(&configs);
        return Ok(true);
    }

    let mut processor = DocumentProcessor::new(configs, processor_options(args))?;

    // Every input needs a family before anything is parsed
    let jobs = processor.plan(&args.files)?;

    if args.debug_text {
        let mut failed = 0;
        for job in &jobs {
            match processor.extract_text(job) {
                Ok(text) => print_extracted_text(&job.input, &text),
                Err(e) => {
                    log::error!("❌ {}: {e:#}", job.input.display());
                    failed += 1;
                }
            }
        }
        return Ok(failed == 0);
    }

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = writer_for(args.format, out);
    writer.write_header()?;

    let mut failed = 0;
    let mut written = 0;
    for job in &jobs {
        match processor.process_document(job) {
            Ok(records) => {
                for record in &records {
                    writer.write_record(record)?;
                }
                written += records.len();
            }
            Err(e) => {
                log::error!("❌ Processing failed for {}: {e:#}", job.input.display());
                failed += 1;
            }
        }
    }
    writer.finish()?;

    if let Some(path) = &args.output {
        log::info!("💾 {} records saved to: {}", written, path.display());
    }
    if failed > 0 {
        log::error!("❌ {} of {} documents failed", failed, jobs.len());
    }
    Ok(failed == 0)
}

fn processor_options(args: &Args) -> ProcessorOptions {
    let defaults = BackendPaths::default();
    let cache_dir = args.cache_dir.clone().or_else(|| {
        args.cache
            .then(|| dirs::cache_dir().map(|dir| dir.join("paragraf")))
            .flatten()
    });

    ProcessorOptions {
        path_prefix: args.path_prefix.clone(),
        backend_override: args.pdftotext_override,
        backend_paths: BackendPaths {
            pdftotext: args.pdftotext_path.clone().unwrap_or(defaults.pdftotext),
            pdfact: args.pdfact_path.clone().unwrap_or(defaults.pdfact),
            pdftohtml: args.pdftohtml_path.clone().unwrap_or(defaults.pdftohtml),
        },
        cache_dir,
        skip_cache: args.skip_cache,
        profile: args.profile,
    }
}

fn print_extracted_text(input: &std::path::Path, text: &str) {
    let frame = ">".repeat(80);
    println!("Extracted text for \"{}\"", input.display());
    println!("\n{frame}\n");
    println!("{text}");
    println!("\n{frame}\n");
}

fn show_configs(configs: &ConfigManager) {
    println!("\n📋 Document families (first match on the input path wins):");
    for (path_pattern, config) in configs.families() {
        println!(
            "  {:<12} path {:<32} backend {:<10} h2 {}",
            config.family,
            path_pattern,
            config.backend,
            if config.h2.is_some() { "yes" } else { "no" }
        );
    }

    println!("\n🔧 Backends: {}", BackendKind::ALL.map(|k| k.as_str()).join(", "));

    println!("\n📝 Usage Examples:");
    println!("  paragraf pdfs/satzungen/*.pdf > satzungen.tsv");
    println!("  paragraf --pdftotext-override pdftohtml pdfs/senat/*.pdf");
    println!("  paragraf --config families.yaml --format jsonl -o out.jsonl pdfs/ordnungen/*.pdf");
    println!("  paragraf --debug-text pdfs/stuko/2020-11-04\\ Protokoll.pdf");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["paragraf", "pdfs/satzungen/a.pdf"]).unwrap();
        assert_eq!(args.log_level, "INFO");
        assert_eq!(args.format, OutputFormat::Tsv);

        let options = processor_options(&args);
        assert_eq!(options.path_prefix, "data/");
        assert_eq!(options.backend_override, None);
        assert_eq!(options.cache_dir, None);
        assert_eq!(options.backend_paths.pdftohtml, PathBuf::from("/usr/bin/pdftohtml"));
    }

    #[test]
    fn test_override_and_paths() {
        let args = Args::try_parse_from([
            "paragraf",
            "--pdftotext-override",
            "pdfact",
            "--pdfact-path",
            "/opt/pdfact/bin/pdfact",
            "--format",
            "jsonl",
            "--cache-dir",
            "/tmp/paragraf",
            "a.pdf",
            "b.pdf",
        ])
        .unwrap();

        let options = processor_options(&args);
        assert_eq!(options.backend_override, Some(BackendKind::PdfAct));
        assert_eq!(options.backend_paths.pdfact, PathBuf::from("/opt/pdfact/bin/pdfact"));
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/paragraf")));
        assert_eq!(args.format, OutputFormat::JsonLines);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Args::try_parse_from(["paragraf", "--pdftotext-override", "tika", "a.pdf"]).is_err());
        assert!(Args::try_parse_from(["paragraf", "--log-level", "TRACE", "a.pdf"]).is_err());
        assert!(Args::try_parse_from(["paragraf"]).is_err());
        assert!(Args::try_parse_from(["paragraf", "--show-configs"]).is_ok());
    }
}
