//! Citation numbering and document rewriting.
//!
//! This module assigns per-document sequence numbers to cited keys and
//! orchestrates the rewrite of one document: disclaimer removal, tag
//! replacement, base URL expansion, and bibliography insertion.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::bibtex::{BibEntry, Bibliography};
use crate::config::Config;
use crate::markdown::{expand_site_base_url, extract_cite_tags, strip_disclaimer};
use crate::output::{render_bibliography, replace_citations, splice_bibliography};

/// A citation tag that has been converted to its numeric marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCitation {
    /// The span in the original text where this citation was found
    pub original_span: (usize, usize),
    /// The replacement text (e.g., "[1, 2]")
    pub formatted: String,
}

/// The in-text marker assigned to a cited key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// 1-based position in the document's bibliography
    Index(usize),
    /// The key is in neither the bibliography nor the fallback entries
    Unresolved,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Index(index) => write!(f, "{}", index),
            Marker::Unresolved => f.write_str("?"),
        }
    }
}

/// Per-document record of cited keys in first-appearance order.
///
/// Resolved keys get dense indices `1..=N`; a key cited again gets the
/// marker it was first assigned.
#[derive(Debug)]
pub struct CitationTable<'a> {
    bibliography: &'a Bibliography,
    fallback: &'a Bibliography,
    entries: Vec<(String, &'a BibEntry)>,
    markers: HashMap<String, Marker>,
}

impl<'a> CitationTable<'a> {
    pub fn new(bibliography: &'a Bibliography, fallback: &'a Bibliography) -> Self {
        Self {
            bibliography,
            fallback,
            entries: Vec::new(),
            markers: HashMap::new(),
        }
    }

    /// Returns the marker for `key`, assigning the next index on first use.
    ///
    /// The bibliography is consulted before the fallback entries. A key found
    /// in neither is logged once and marked unresolved.
    pub fn cite(&mut self, key: &str) -> Marker {
        if let Some(marker) = self.markers.get(key) {
            return *marker;
        }

        let marker = match self
            .bibliography
            .get(key)
            .or_else(|| self.fallback.get(key))
        {
            Some(entry) => {
                self.entries.push((key.to_string(), entry));
                Marker::Index(self.entries.len())
            }
            None => {
                warn!(key, "citation key not found in bibliography");
                Marker::Unresolved
            }
        };

        self.markers.insert(key.to_string(), marker);
        marker
    }

    /// Resolved entries in first-appearance order.
    pub fn entries(&self) -> &[(String, &'a BibEntry)] {
        &self.entries
    }

    /// Number of distinct resolved keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that could not be resolved, sorted.
    pub fn unresolved(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .markers
            .iter()
            .filter(|(_, marker)| **marker == Marker::Unresolved)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

/// The result of rewriting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// The rewritten document text
    pub content: String,
    /// Number of distinct citation keys that were resolved
    pub resolved: usize,
    /// Keys found in neither the bibliography nor the fallback entries
    pub unresolved: Vec<String>,
}

/// Converts citation tags in `markdown` to numbered references.
///
/// # Examples
///
/// ```
/// use citenum::{parse_bibliography, rewrite_document, Config};
///
/// let bib = parse_bibliography(
///     "@article{smith2020, author={Smith, J. and Doe, A.}, title={A Study}, \
///      journal={J. Things}, year={2020}}",
/// );
/// let result = rewrite_document("See {% cite smith2020 %}.", &bib, &Config::default());
///
/// assert!(result.content.starts_with("See [1]."));
/// assert!(result
///     .content
///     .contains("1. Smith, J., Doe, A. (2020). A Study. *J. Things*."));
/// assert_eq!(result.resolved, 1);
/// ```
pub fn rewrite_document(markdown: &str, bibliography: &Bibliography, config: &Config) -> Rewrite {
    let content = strip_disclaimer(markdown);

    let mut table = CitationTable::new(bibliography, &config.fallback);
    let processed = number_citations(&content, &mut table);
    let content = replace_citations(&content, &processed);

    let content = expand_site_base_url(&content, &config.site_base_url_token, &config.site_origin);

    let content = if table.is_empty() {
        content
    } else {
        let section = render_bibliography(&table, &config.heading);
        splice_bibliography(&content, &section, &config.heading)
    };

    Rewrite {
        content,
        resolved: table.len(),
        unresolved: table.unresolved(),
    }
}

/// Assigns markers to every non-placeholder tag, in document order.
///
/// A tag with several keys becomes one bracketed, comma-joined list.
pub fn number_citations(markdown: &str, table: &mut CitationTable<'_>) -> Vec<ProcessedCitation> {
    extract_cite_tags(markdown)
        .into_iter()
        .filter(|tag| !tag.is_placeholder())
        .map(|tag| {
            let markers: Vec<String> = tag
                .keys
                .iter()
                .map(|key| table.cite(key).to_string())
                .collect();
            ProcessedCitation {
                original_span: tag.span,
                formatted: format!("[{}]", markers.join(", ")),
            }
        })
        .collect()
}
