//! Run configuration.
//!
//! Holds the values a conversion run needs besides the bibliography itself:
//! where the BibTeX file lives, which documents to look for, the site base
//! URL token and its expansion, the section heading, and fallback entries
//! for keys missing from the BibTeX file. Every field has a built-in default
//! and can be overridden from a JSON file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bibtex::{BibEntry, Bibliography, EntryType};

/// Default location of the BibTeX file, relative to the working directory.
pub const DEFAULT_BIBLIOGRAPHY: &str = "_bibliography/references.bib";

/// Default heading of the generated bibliography section.
pub const DEFAULT_HEADING: &str = "## Bibliography";

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Configuration for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the BibTeX file
    pub bibliography: PathBuf,
    /// Candidate documents, used when no files are given explicitly
    pub documents: Vec<PathBuf>,
    /// Template token to replace (e.g., `{{ site.baseurl }}`)
    pub site_base_url_token: String,
    /// Absolute origin the token expands to
    pub site_origin: String,
    /// Heading line of the bibliography section
    pub heading: String,
    /// Entries used when a cited key is absent from the bibliography
    pub fallback: Bibliography,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bibliography: PathBuf::from(DEFAULT_BIBLIOGRAPHY),
            documents: default_documents(),
            site_base_url_token: "{{ site.baseurl }}".to_string(),
            site_origin: "https://rdmkit.elixir-europe.org".to_string(),
            heading: DEFAULT_HEADING.to_string(),
            fallback: fallback_entries(),
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The document set, in both hyphen- and underscore-separated spellings.
fn default_documents() -> Vec<PathBuf> {
    [
        "federated-learning-main.md",
        "federated_learning.md",
        "federated_learning_threats.md",
        "federated_learning_ops.md",
        "federated_learning_green.md",
        "federated-learning.md",
        "federated-learning-threats.md",
        "federated-learning-ops.md",
        "federated-learning-green.md",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// Entries known to be missing from the shipped BibTeX file.
pub fn fallback_entries() -> Bibliography {
    vec![
        BibEntry::new("bonawitz2019towards", EntryType::InProceedings)
            .with_field(
                "author",
                "Bonawitz, Keith and Eichner, Hubert and Grieskamp, Wolfgang and Huba, Dzmitry \
                 and Ingerman, Alex and Ivanov, Vladimir and Kiddon, Chloé and Konečný, Jakub \
                 and Mazzocchi, Stefano and McMahan, Brendan and Van Overveldt, Timon \
                 and Petrou, David and Ramage, Daniel and Roselander, Jason",
            )
            .with_field("title", "Towards Federated Learning at Scale: System Design")
            .with_field("booktitle", "Proceedings of Machine Learning and Systems")
            .with_field("year", "2019")
            .with_field("volume", "1")
            .with_field("pages", "374-388")
            .with_field(
                "url",
                "https://proceedings.mlsys.org/paper/2019/file/bd686fd640be98efaae0091fa301e613-Paper.pdf",
            ),
        BibEntry::new("wuyts2015linddun", EntryType::TechReport)
            .with_field("author", "Wuyts, Kim and Joosen, Wouter")
            .with_field("title", "LINDDUN privacy threat modeling: a tutorial")
            .with_field("institution", "CW Reports, KU Leuven")
            .with_field("year", "2015")
            .with_field("url", "https://downloads.linddun.org/tutorials/pro/v0/tutorial.pdf"),
    ]
    .into()
}

/// Keeps the candidates that exist on disk, dropping repeated paths.
///
/// Order follows the candidate list.
pub fn discover_documents(candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|path| path.is_file())
        .filter(|path| seen.insert((*path).clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bibliography, PathBuf::from("_bibliography/references.bib"));
        assert_eq!(config.heading, "## Bibliography");
        assert!(config.documents.contains(&PathBuf::from("federated_learning.md")));
        assert!(config.documents.contains(&PathBuf::from("federated-learning.md")));
    }

    #[test]
    fn test_builtin_fallback_entries() {
        let fallback = fallback_entries();
        assert_eq!(fallback.len(), 2);

        let bonawitz = fallback.get("bonawitz2019towards").unwrap();
        assert_eq!(bonawitz.entry_type, EntryType::InProceedings);
        assert!(bonawitz.get("author").unwrap().contains("Kiddon, Chloé"));

        let wuyts = fallback.get("wuyts2015linddun").unwrap();
        assert_eq!(wuyts.get("institution"), Some("CW Reports, KU Leuven"));
    }

    #[test]
    fn test_from_json_partial_keeps_defaults() {
        // Given: a config that only overrides the heading
        let json = r###"{"heading": "## References"}"###;

        // When: we load it
        let config = Config::from_json(json).unwrap();

        // Then: other values keep their defaults
        assert_eq!(config.heading, "## References");
        assert_eq!(config.site_origin, "https://rdmkit.elixir-europe.org");
        assert_eq!(config.fallback.len(), 2);
    }

    #[test]
    fn test_from_json_replaces_fallback() {
        let json = r#"{"fallback": [{"key": "x", "type": "misc", "fields": {"title": "X"}}]}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.fallback.len(), 1);
        assert_eq!(config.fallback.get("x").unwrap().get("title"), Some("X"));
    }

    #[test]
    fn test_from_json_invalid() {
        let result = Config::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/citenum.json"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_discover_documents_filters_and_dedups() {
        // Given: a directory with two of four candidates present
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("federated_learning.md");
        let b = dir.path().join("federated-learning-ops.md");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let candidates = vec![
            b.clone(),
            dir.path().join("missing.md"),
            a.clone(),
            b.clone(),
        ];

        // When: we discover documents
        let found = discover_documents(&candidates);

        // Then: only existing files remain, once each, in candidate order
        assert_eq!(found, vec![b, a]);
    }
}
