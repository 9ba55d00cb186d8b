//! citenum: convert `{% cite %}` tags in Markdown documents into numbered
//! references backed by a BibTeX bibliography.
//!
//! This library provides functionality to:
//! - Parse a BibTeX file into normalized entries
//! - Extract citation tags from Markdown documents
//! - Number cited keys per document in first-appearance order
//! - Render and insert a `## Bibliography` section

pub mod bibtex;
pub mod config;
pub mod latex;
pub mod markdown;
pub mod output;
pub mod processor;
pub mod style;

pub use bibtex::{load_bibliography, parse_bibliography, BibEntry, Bibliography, EntryType};
pub use config::{discover_documents, Config};
pub use markdown::{extract_cite_tags, CitationTag};
pub use output::{render_bibliography, replace_citations, splice_bibliography};
pub use processor::{rewrite_document, CitationTable, Marker, ProcessedCitation, Rewrite};
pub use style::format_entry;
