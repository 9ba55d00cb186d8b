//! Output generation for numbered citations and the bibliography section.
//!
//! This module handles replacing citation tags in the Markdown text and
//! inserting or replacing the rendered bibliography section.

use tracing::debug;

use crate::markdown::find_section;
use crate::processor::{CitationTable, ProcessedCitation};
use crate::style::format_entry;

/// Replaces citation tags in the Markdown with their numeric markers.
///
/// Replacements are performed from the end of the text towards the beginning
/// so that earlier spans stay valid.
pub fn replace_citations(markdown: &str, processed: &[ProcessedCitation]) -> String {
    if processed.is_empty() {
        return markdown.to_string();
    }

    let mut sorted_citations: Vec<_> = processed.iter().collect();
    sorted_citations.sort_by(|a, b| b.original_span.0.cmp(&a.original_span.0));

    let mut result = markdown.to_string();
    for citation in sorted_citations {
        let (start, end) = citation.original_span;
        result.replace_range(start..end, &citation.formatted);
    }

    result
}

/// Renders the bibliography section for a document's cited entries.
///
/// One numbered line per entry in first-appearance order, separated by blank
/// lines. An entry with nothing to render still gets its numbered line so the
/// numbering matches the in-text markers.
pub fn render_bibliography(table: &CitationTable<'_>, heading: &str) -> String {
    let lines: Vec<String> = table
        .entries()
        .iter()
        .enumerate()
        .map(|(i, (key, entry))| {
            let index = i + 1;
            let formatted = format_entry(entry);
            if formatted.is_empty() {
                debug!(index, key = %key, "empty formatting for reference");
            }
            format!("{}. {}", index, formatted).trim_end().to_string()
        })
        .collect();

    format!("{}\n\n{}\n", heading, lines.join("\n\n"))
}

/// Inserts a rendered bibliography section into the document.
///
/// An existing section under the same heading is replaced through to the end
/// of the document. Otherwise the section is appended after a blank line.
pub fn splice_bibliography(content: &str, section: &str, heading: &str) -> String {
    if let Some(start) = find_section(content, heading) {
        let mut output = content[..start].to_string();
        output.push_str(section);
        return output;
    }

    let mut output = content.to_string();
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output.push('\n');
    output.push_str(section);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::{BibEntry, Bibliography, EntryType};

    const HEADING: &str = "## Bibliography";

    // ===========================================
    // Tests for replace_citations
    // ===========================================

    #[test]
    fn test_replace_citations_simple() {
        // Given: A markdown text with one citation tag
        let markdown = "See {% cite a %} here.";
        let processed = vec![ProcessedCitation {
            original_span: (4, 16),
            formatted: "[1]".to_string(),
        }];

        // When: We replace citations
        let result = replace_citations(markdown, &processed);

        // Then: The tag is replaced with the marker
        assert_eq!(result, "See [1] here.");
    }

    #[test]
    fn test_replace_citations_multiple_out_of_order() {
        // Given: processed citations not sorted by position
        let markdown = "{% cite a %} and {% cite b c %}";
        let processed = vec![
            ProcessedCitation {
                original_span: (17, 31),
                formatted: "[2, 3]".to_string(),
            },
            ProcessedCitation {
                original_span: (0, 12),
                formatted: "[1]".to_string(),
            },
        ];

        // When: We replace citations
        let result = replace_citations(markdown, &processed);

        // Then: Both are replaced correctly
        assert_eq!(result, "[1] and [2, 3]");
    }

    #[test]
    fn test_replace_citations_empty_list() {
        let markdown = "Text without citations.";
        assert_eq!(replace_citations(markdown, &[]), markdown);
    }

    // ===========================================
    // Tests for render_bibliography
    // ===========================================

    #[test]
    fn test_render_bibliography_orders_and_numbers() {
        // Given: two cited entries
        let bib: Bibliography = vec![
            BibEntry::new("x", EntryType::Book).with_field("title", "X"),
            BibEntry::new("y", EntryType::Book).with_field("title", "Y"),
        ]
        .into();
        let fallback = Bibliography::new();
        let mut table = CitationTable::new(&bib, &fallback);
        table.cite("y");
        table.cite("x");

        // When: We render the section
        let section = render_bibliography(&table, HEADING);

        // Then: Entries follow first-appearance order
        assert_eq!(section, "## Bibliography\n\n1. *Y*.\n\n2. *X*.\n");
    }

    #[test]
    fn test_render_bibliography_keeps_empty_entry_line() {
        let bib: Bibliography = vec![BibEntry::new("empty", EntryType::Misc)].into();
        let fallback = Bibliography::new();
        let mut table = CitationTable::new(&bib, &fallback);
        table.cite("empty");

        assert_eq!(render_bibliography(&table, HEADING), "## Bibliography\n\n1.\n");
    }

    // ===========================================
    // Tests for splice_bibliography
    // ===========================================

    #[test]
    fn test_splice_appends_with_blank_line() {
        let section = "## Bibliography\n\n1. A.\n";
        assert_eq!(
            splice_bibliography("Body.\n", section, HEADING),
            "Body.\n\n## Bibliography\n\n1. A.\n"
        );
        assert_eq!(
            splice_bibliography("Body.", section, HEADING),
            "Body.\n\n## Bibliography\n\n1. A.\n"
        );
    }

    #[test]
    fn test_splice_replaces_existing_section_to_end() {
        // Given: a document with a stale bibliography
        let content = "Body.\n\n## Bibliography\n\n1. Old.\n\n2. Older.\n";
        let section = "## Bibliography\n\n1. New.\n";

        // When: We splice the new section
        let result = splice_bibliography(content, section, HEADING);

        // Then: Everything from the heading on is replaced
        assert_eq!(result, "Body.\n\n## Bibliography\n\n1. New.\n");
    }

    #[test]
    fn test_splice_custom_heading() {
        let content = "Body.\n\n## References\n\nold\n";
        let result = splice_bibliography(content, "## References\n\nnew\n", "## References");
        assert_eq!(result, "Body.\n\n## References\n\nnew\n");
    }
}
