use crate::error::Error;
use crate::preprocessors::pdf::BackendKind;
use crate::types::{DocumentMetadata, NO_DATE, NO_TITLE};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_title_pattern() -> String {
    r"\d\d\d\d-\d\d-\d\d\s(.*).pdf$".to_string()
}

fn default_date_pattern() -> String {
    r"(\d\d\d\d-\d\d-\d\d)".to_string()
}

/// Rules for one family of documents, as written in a family file.
///
/// Heading patterns may name their groups `text` and `number`; otherwise
/// group 1 is the heading text and group 2 its numeral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRules {
    pub name: String,
    /// Searched for in the input path to select this family
    pub path_pattern: String,
    /// Level-1 heading ("§ 14", "Artikel 3", "TOP 2")
    pub h1_pattern: String,
    /// Level-2 heading ("(3)"); none means the family has no level 2
    #[serde(default)]
    pub h2_pattern: Option<String>,
    /// Line that starts a new content buffer without ending the section
    #[serde(default)]
    pub paragraph_pattern: Option<String>,
    /// Require that H1 is in bold
    #[serde(default = "default_true")]
    pub h1_must_be_bold: bool,
    /// Require that H1 starts a new paragraph
    #[serde(default)]
    pub h1_must_start_paragraph: bool,
    /// Don't extend H1 beyond the line the pattern matched
    #[serde(default)]
    pub h1_single_line_only: bool,
    /// Join words that were hyphenated by line breaks
    #[serde(default = "default_true")]
    pub join_hyphenated_words: bool,
    /// Output sections without content
    #[serde(default)]
    pub output_empty_content_sections: bool,
    /// Output sections without a level-1 header
    #[serde(default)]
    pub output_headerless_sections: bool,
    /// Applied to the input path; group 1 is the title
    #[serde(default = "default_title_pattern")]
    pub title_pattern: String,
    /// Applied to the input path; group 1 is the date
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
    /// Extraction tool used unless overridden
    #[serde(default)]
    pub backend: BackendKind,
}

impl FamilyRules {
    /// Rules with the default policies and metadata patterns.
    pub fn new(name: &str, path_pattern: &str, h1_pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            path_pattern: path_pattern.to_string(),
            h1_pattern: h1_pattern.to_string(),
            h2_pattern: None,
            paragraph_pattern: None,
            h1_must_be_bold: true,
            h1_must_start_paragraph: false,
            h1_single_line_only: false,
            join_hyphenated_words: true,
            output_empty_content_sections: false,
            output_headerless_sections: false,
            title_pattern: default_title_pattern(),
            date_pattern: default_date_pattern(),
            backend: BackendKind::default(),
        }
    }

    /// Satzungen and Gesetze: H1 = Paragraph (§ 14, Artikel 3), H2 = Absatz
    /// ((3), (3a)). No content outside Absätze.
    pub fn satzungen() -> Self {
        let absatz = r"^\s*(?P<text>\((?P<number>\d+[a-z]?)\))";
        Self {
            h2_pattern: Some(absatz.to_string()),
            paragraph_pattern: Some(absatz.to_string()),
            ..Self::new(
                "satzungen",
                "/(satzungen|gesetze)/",
                r"^(?P<text>\s*(?:§|Artikel)\s*(?P<number>\d+).*)$",
            )
        }
    }

    /// Senate minutes: title is the file name, date at its end.
    pub fn senat() -> Self {
        Self {
            name: "senat".to_string(),
            path_pattern: "/senat/".to_string(),
            title_pattern: r"/([^/]+)\.pdf$".to_string(),
            date_pattern: r"(\d\d.\d\d.\d\d\d\d)(?:\.pdf)?$".to_string(),
            ..Self::protokolle()
        }
    }

    /// Minutes (Protokolle) of committees: H1 = TOP (agenda item), no H2.
    pub fn protokolle() -> Self {
        Self::new(
            "protokolle",
            "/(stuko|promo|dekanat|senat)/",
            r"^(?P<text>\s*T[Oo][Pp]\s*:?\s*(?P<number>[0-9.]+).*)$",
        )
    }

    /// Reading material: numbered chapters, every line its own unit.
    pub fn reading() -> Self {
        Self {
            h2_pattern: Some(r"^(?P<text>(?P<number>).*)".to_string()),
            title_pattern: r"/([^/]+)\.pdf$".to_string(),
            date_pattern: "^$".to_string(),
            ..Self::new("reading", "/reading/", r"^(?P<text>\s*(?P<number>\d+).*)$")
        }
    }

    /// Built-in families in the order they are tried.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::satzungen(),
            Self::senat(),
            Self::protokolle(),
            Self::reading(),
        ]
    }
}

/// Top-level shape of a family file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyFile {
    pub families: Vec<FamilyRules>,
}

/// Compiled, read-only rules for parsing one document.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub family: String,
    pub h1: Regex,
    pub h2: Option<Regex>,
    pub paragraph: Option<Regex>,
    pub h1_must_be_bold: bool,
    pub h1_must_start_paragraph: bool,
    pub h1_single_line_only: bool,
    pub join_hyphenated_words: bool,
    pub output_empty_content_sections: bool,
    pub output_headerless_sections: bool,
    pub title: Regex,
    pub date: Regex,
    pub backend: BackendKind,
}

impl DocumentConfig {
    pub fn from_rules(rules: &FamilyRules) -> Result<Self> {
        let compile = |field: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                family: rules.name.clone(),
                field,
                pattern: pattern.to_string(),
                source,
            })
        };

        Ok(Self {
            family: rules.name.clone(),
            h1: compile("h1", &rules.h1_pattern)?,
            h2: rules
                .h2_pattern
                .as_deref()
                .map(|p| compile("h2", p))
                .transpose()?,
            paragraph: rules
                .paragraph_pattern
                .as_deref()
                .map(|p| compile("paragraph", p))
                .transpose()?,
            h1_must_be_bold: rules.h1_must_be_bold,
            h1_must_start_paragraph: rules.h1_must_start_paragraph,
            h1_single_line_only: rules.h1_single_line_only,
            join_hyphenated_words: rules.join_hyphenated_words,
            output_empty_content_sections: rules.output_empty_content_sections,
            output_headerless_sections: rules.output_headerless_sections,
            title: compile("title", &rules.title_pattern)?,
            date: compile("date", &rules.date_pattern)?,
            backend: rules.backend,
        })
    }

    /// Title from the input path, or `NO_TITLE`.
    pub fn extract_title(&self, input_path: &str) -> String {
        first_group(&self.title, input_path).unwrap_or_else(|| NO_TITLE.to_string())
    }

    /// Date from the input path, or `NO_DATE`.
    pub fn extract_date(&self, input_path: &str) -> String {
        first_group(&self.date, input_path).unwrap_or_else(|| NO_DATE.to_string())
    }

    /// Metadata columns for a document: `path` is `path_prefix` plus the
    /// file name with `#` percent-encoded, the title loses its `#`.
    pub fn metadata_for(&self, input: &Path, path_prefix: &str) -> DocumentMetadata {
        let input_str = input.to_string_lossy();
        let basename = input
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        DocumentMetadata {
            path: crate::rules::normalizer::encode_path(&format!("{path_prefix}{basename}")),
            title: crate::rules::normalizer::sanitize_title(&self.extract_title(&input_str)),
            date: self.extract_date(&input_str),
        }
    }
}

fn first_group(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// Executable locations of the extraction tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendPaths {
    pub pdftotext: PathBuf,
    pub pdfact: PathBuf,
    pub pdftohtml: PathBuf,
}

impl Default for BackendPaths {
    fn default() -> Self {
        Self {
            // pdftotext with the -semantic-layout extension
            pdftotext: PathBuf::from("/usr/local/bin/pdftotext"),
            pdfact: PathBuf::from("/local/data/pdfact/bin/pdfact"),
            pdftohtml: PathBuf::from("/usr/bin/pdftohtml"),
        }
    }
}

/// Run-wide settings for the document processor
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Prefix of the `path` column, joined with the file name
    pub path_prefix: String,
    /// Force one extraction tool regardless of family (for debugging)
    pub backend_override: Option<BackendKind>,
    pub backend_paths: BackendPaths,
    /// Directory for cached extraction results, if caching is wanted
    pub cache_dir: Option<PathBuf>,
    /// Skip cache lookups and stores
    pub skip_cache: bool,
    /// Log per-step timings
    pub profile: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            path_prefix: "data/".to_string(),
            backend_override: None,
            backend_paths: BackendPaths::default(),
            cache_dir: None,
            skip_cache: false,
            profile: false,
        }
    }
}

/// Owns the known document families and picks one per input path.
///
/// Families registered or loaded from files are tried before the built-in
/// ones, in the order they were added.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    families: Vec<(Regex, DocumentConfig)>,
    custom_count: usize,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let mut manager = Self {
            families: Vec::new(),
            custom_count: 0,
        };

        // Load built-in configs
        for rules in FamilyRules::builtin() {
            let entry = Self::compile(&rules)?;
            manager.families.push(entry);
        }

        Ok(manager)
    }

    /// Add a family ahead of the built-ins.
    pub fn register(&mut self, rules: &FamilyRules) -> Result<()> {
        let entry = Self::compile(rules)?;
        self.families.insert(self.custom_count, entry);
        self.custom_count += 1;
        log::debug!("Registered document family '{}'", rules.name);
        Ok(())
    }

    /// Load a YAML family file; returns the number of families added.
    pub fn load_config_from_file(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path).map_err(Error::from)?;
        let file: FamilyFile = serde_yaml::from_str(&content).map_err(Error::from)?;
        for rules in &file.families {
            self.register(rules)?;
        }
        Ok(file.families.len())
    }

    /// Pick the config for an input path. No match is an error.
    pub fn config_for_path(&self, input: &Path) -> Result<&DocumentConfig> {
        let input_str = input.to_string_lossy();
        let config = self
            .families
            .iter()
            .find(|(path_pattern, _)| path_pattern.is_match(&input_str))
            .map(|(_, config)| config)
            .ok_or_else(|| Error::NoConfigForPath {
                path: input_str.to_string(),
            })?;

        log::debug!("CONFIG: {} for {}", config.family, input_str);
        Ok(config)
    }

    /// Family names in lookup order.
    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|(_, c)| c.family.as_str()).collect()
    }

    /// Path pattern and config of every family, in lookup order.
    pub fn families(&self) -> impl Iterator<Item = (&str, &DocumentConfig)> + '_ {
        self.families.iter().map(|(path, config)| (path.as_str(), config))
    }

    fn compile(rules: &FamilyRules) -> Result<(Regex, DocumentConfig)> {
        let path_pattern = Regex::new(&rules.path_pattern).map_err(|source| Error::InvalidPattern {
            family: rules.name.clone(),
            field: "path",
            pattern: rules.path_pattern.clone(),
            source,
        })?;
        Ok((path_pattern, DocumentConfig::from_rules(rules)?))
    }
}
