//! BibTeX bibliography parsing.
//!
//! A small hand-written scanner: entries are located by `@type{`, the body is
//! delimited by brace depth, and each `name = {value}` field is captured with
//! its nested braces intact before LaTeX normalization.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::latex::normalize_field;

/// Errors that can occur when loading a bibliography.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
}

/// BibTeX entry type.
///
/// Types without dedicated formatting keep their lowercased name in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    Article,
    InProceedings,
    Book,
    Misc,
    Online,
    TechReport,
    Other(String),
}

impl EntryType {
    /// Parses an entry type name (case-insensitive).
    pub fn parse(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "article" => Self::Article,
            "inproceedings" => Self::InProceedings,
            "book" => Self::Book,
            "misc" => Self::Misc,
            "online" => Self::Online,
            "techreport" => Self::TechReport,
            _ => Self::Other(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::InProceedings => "inproceedings",
            Self::Book => "book",
            Self::Misc => "misc",
            Self::Online => "online",
            Self::TechReport => "techreport",
            Self::Other(name) => name,
        }
    }

    /// Types for which a DOI is preferred over a plain URL.
    pub fn is_scholarly(&self) -> bool {
        matches!(
            self,
            Self::Article | Self::InProceedings | Self::Book | Self::TechReport
        )
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EntryType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<EntryType> for String {
    fn from(entry_type: EntryType) -> Self {
        entry_type.as_str().to_string()
    }
}

/// A single bibliography entry with normalized field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    /// The citation key (e.g., "smith2020")
    pub key: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Lowercase field name to value
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            key: key.into(),
            entry_type,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter. The value is stored verbatim.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// All entries of a bibliography, indexed by citation key.
///
/// Serialized as a list of entries sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<BibEntry>", into = "Vec<BibEntry>")]
pub struct Bibliography {
    entries: HashMap<String, BibEntry>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry; an existing entry with the same key is replaced.
    pub fn insert(&mut self, entry: BibEntry) -> Option<BibEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key, for stable output.
    pub fn sorted(&self) -> Vec<&BibEntry> {
        let mut entries: Vec<&BibEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

impl From<Vec<BibEntry>> for Bibliography {
    fn from(entries: Vec<BibEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Bibliography> for Vec<BibEntry> {
    fn from(bibliography: Bibliography) -> Self {
        let mut entries: Vec<BibEntry> = bibliography.entries.into_values().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

impl FromIterator<BibEntry> for Bibliography {
    fn from_iter<I: IntoIterator<Item = BibEntry>>(iter: I) -> Self {
        let mut bibliography = Self::new();
        for entry in iter {
            bibliography.insert(entry);
        }
        bibliography
    }
}

/// Loads and parses a BibTeX file.
///
/// # Errors
///
/// Returns an error only if the file cannot be read; parsing itself is
/// best-effort and never fails.
pub fn load_bibliography(path: &Path) -> Result<Bibliography, BibError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_bibliography(&content))
}

/// Parses BibTeX source into a [`Bibliography`].
///
/// Later entries with a duplicate key replace earlier ones. `@comment`,
/// `@preamble` and `@string` blocks are skipped.
///
/// # Examples
///
/// ```
/// use citenum::bibtex::{parse_bibliography, EntryType};
///
/// let bib = parse_bibliography("@Article{smith2020, title={A {Study}}, year={2020}}");
/// let entry = bib.get("smith2020").unwrap();
/// assert_eq!(entry.entry_type, EntryType::Article);
/// assert_eq!(entry.get("title"), Some("A Study"));
/// ```
pub fn parse_bibliography(input: &str) -> Bibliography {
    let bytes = input.as_bytes();
    let n = bytes.len();
    let mut bibliography = Bibliography::new();
    let mut i = 0;

    while i < n {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }

        // Entry type
        let mut j = i + 1;
        while j < n && bytes[j].is_ascii_alphabetic() {
            j += 1;
        }
        let type_name = input[i + 1..j].to_ascii_lowercase();

        while j < n && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        // An `@` in free text, such as an email address in a comment line
        if type_name.is_empty() || j >= n || bytes[j] != b'{' {
            i = j;
            continue;
        }
        j += 1;

        if matches!(type_name.as_str(), "comment" | "preamble" | "string") {
            i = skip_balanced(bytes, j);
            continue;
        }

        // Citation key
        let mut k = j;
        while k < n && !matches!(bytes[k], b',' | b'\n' | b'}') {
            k += 1;
        }
        let key = input[j..k].trim();

        if k < n && bytes[k] == b',' {
            k += 1;
        }
        // For `@misc{key}` the body starts at the closing brace and is empty.
        let body_start = k;
        let end = skip_balanced(bytes, body_start);
        // `end` is one past the closing brace, or `n` for an unterminated entry.
        let body_end = if end > body_start && bytes[end - 1] == b'}' {
            end - 1
        } else {
            end
        };

        if key.is_empty() {
            debug!(entry_type = %type_name, "skipping entry without citation key");
        } else {
            let mut entry = BibEntry::new(key, EntryType::parse(&type_name));
            entry.fields = parse_fields(&input[body_start..body_end], key);
            bibliography.insert(entry);
        }

        i = end;
    }

    bibliography
}

/// Scans from just after an opening brace to just past its matching close.
///
/// Returns `bytes.len()` when the input ends before depth returns to zero.
fn skip_balanced(bytes: &[u8], start: usize) -> usize {
    let mut depth = 1usize;
    let mut pos = start;
    while pos < bytes.len() && depth > 0 {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        pos += 1;
    }
    pos
}

/// Parses the `name = {value}` list of one entry body.
fn parse_fields(body: &str, key: &str) -> BTreeMap<String, String> {
    let bytes = body.as_bytes();
    let n = bytes.len();
    let mut fields = BTreeMap::new();
    let mut pos = 0;

    while pos < n {
        while pos < n && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= n {
            break;
        }

        let name_start = pos;
        while pos < n && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
            pos += 1;
        }
        let name = body[name_start..pos].to_ascii_lowercase();

        while pos < n && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos < n && bytes[pos] == b'=' {
            pos += 1;
        }
        while pos < n && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if pos >= n || bytes[pos] != b'{' {
            debug!(key, field = %name, "skipping field without braced value");
            while pos < n && bytes[pos] != b',' {
                pos += 1;
            }
            continue;
        }

        let value_start = pos + 1;
        pos = skip_balanced(bytes, value_start);
        let value_end = if bytes[pos - 1] == b'}' { pos - 1 } else { pos };
        let value = body[value_start..value_end].trim();

        if !name.is_empty() {
            let value = normalize_field(&name, value);
            fields.insert(name, value);
        }
    }

    fields
}
