//! Markdown citation tag parser.
//!
//! Extracts Liquid-style citation tags `{% cite key1 key2 %}` from Markdown
//! text, and handles the other in-document rewrites that run alongside
//! citation conversion (disclaimer removal, site base URL expansion).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Group 1: the key list, without surrounding whitespace
    static ref CITE_TAG: Regex = Regex::new(r"\{%\s*cite\s+([^%]+?)\s*%\}").unwrap();

    static ref DISCLAIMER: Regex =
        Regex::new(r"(?s)\A(\s*)> \*\*Note\*\*: This page includes citations.*?\n\n").unwrap();
}

/// A citation tag found in the Markdown text.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationTag {
    /// The citation keys, in the order they appear in the tag
    pub keys: Vec<String>,
    /// The raw key list as written between `cite` and `%}`
    pub raw: String,
    /// Start and end byte positions in the original text
    pub span: (usize, usize),
}

impl CitationTag {
    /// Whether this tag is unfilled template syntax such as `{% cite key %}`.
    ///
    /// Placeholders are left in the document untouched, as are tags that
    /// carry no keys at all.
    pub fn is_placeholder(&self) -> bool {
        self.keys.is_empty() || (self.raw.contains("key") && self.raw.chars().count() < 5)
    }
}

/// Extracts all citation tags from the given Markdown text.
///
/// # Examples
///
/// ```
/// use citenum::extract_cite_tags;
///
/// let tags = extract_cite_tags("See {% cite smith2020 doe2021 %}.");
/// assert_eq!(tags.len(), 1);
/// assert_eq!(tags[0].keys, vec!["smith2020", "doe2021"]);
/// ```
pub fn extract_cite_tags(markdown: &str) -> Vec<CitationTag> {
    CITE_TAG
        .captures_iter(markdown)
        .filter_map(|cap| {
            let full_match = cap.get(0)?;
            let raw = cap.get(1)?.as_str().trim().to_string();
            let keys = raw.split_whitespace().map(str::to_string).collect();

            Some(CitationTag {
                keys,
                raw,
                span: (full_match.start(), full_match.end()),
            })
        })
        .collect()
}

/// Removes a leading "this page includes citations" note block, together
/// with the blank line that ends it. A note further down is kept.
pub fn strip_disclaimer(markdown: &str) -> String {
    DISCLAIMER.replace(markdown, "$1").into_owned()
}

/// Replaces every occurrence of the site base URL template token.
pub fn expand_site_base_url(markdown: &str, token: &str, origin: &str) -> String {
    if token.is_empty() {
        return markdown.to_string();
    }
    markdown.replace(token, origin)
}

/// Returns the byte offset of the line holding the given section heading.
///
/// The heading must occupy the whole line (trailing whitespace allowed).
pub fn find_section(markdown: &str, heading: &str) -> Option<usize> {
    let mut offset = 0;
    for line in markdown.split_inclusive('\n') {
        if line.trim_end() == heading {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}
