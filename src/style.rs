//! Reference style.
//!
//! Renders one [`BibEntry`] as a single Markdown bibliography line. The layout
//! depends on the entry type; absent fields are left out of their slot.

use crate::bibtex::{BibEntry, EntryType};

/// Formats an entry as `Authors (Year). Title. Venue. Locator`.
///
/// # Examples
///
/// ```
/// use citenum::bibtex::{BibEntry, EntryType};
/// use citenum::style::format_entry;
///
/// let entry = BibEntry::new("smith2020", EntryType::Article)
///     .with_field("author", "Smith, J. and Doe, A.")
///     .with_field("title", "A Study")
///     .with_field("journal", "J. Things")
///     .with_field("year", "2020");
/// assert_eq!(
///     format_entry(&entry),
///     "Smith, J., Doe, A. (2020). A Study. *J. Things*."
/// );
/// ```
pub fn format_entry(entry: &BibEntry) -> String {
    let mut out = String::new();

    if let Some(author) = entry.get("author") {
        out.push_str(&format_authors(author));
        out.push(' ');
    }

    if let Some(year) = entry.get("year") {
        out.push_str(&format!("({}). ", year));
    }

    let title = entry.get("title");
    match entry.entry_type {
        EntryType::Article => {
            push_plain(&mut out, title);
            if let Some(journal) = entry.get("journal") {
                out.push_str(&format!("*{}*", journal));
                if let Some(volume) = entry.get("volume") {
                    out.push_str(&format!(", {}", volume));
                }
                if let Some(pages) = entry.get("pages") {
                    out.push_str(&format!(", {}", pages));
                }
                out.push_str(". ");
            }
        }
        EntryType::InProceedings => {
            push_plain(&mut out, title);
            if let Some(booktitle) = entry.get("booktitle") {
                out.push_str(&format!("In *{}*", booktitle));
                if let Some(pages) = entry.get("pages") {
                    out.push_str(&format!(", pp. {}", pages));
                }
                out.push_str(". ");
            }
            push_plain(&mut out, entry.get("publisher"));
        }
        EntryType::Book => {
            push_emphasized(&mut out, title);
            push_plain(&mut out, entry.get("publisher"));
        }
        EntryType::Misc | EntryType::Online => {
            push_emphasized(&mut out, title);
            push_plain(
                &mut out,
                entry.get("howpublished").or_else(|| entry.get("note")),
            );
        }
        EntryType::TechReport => {
            push_plain(&mut out, title);
            push_plain(&mut out, entry.get("institution"));
        }
        EntryType::Other(_) => {
            push_emphasized(&mut out, title);
        }
    }

    match (entry.get("doi"), entry.get("url")) {
        (Some(doi), _) if entry.entry_type.is_scholarly() => {
            out.push_str(&format!("DOI: [{}](https://doi.org/{})", doi, doi));
        }
        (_, Some(url)) => {
            out.push_str(&format!("Available at: [{}]({})", url, url));
        }
        _ => {}
    }

    out.truncate(out.trim_end().len());
    out
}

/// Joins a BibTeX `and`-separated author list with commas.
pub fn format_authors(author: &str) -> String {
    author.replace(" and ", ", ")
}

fn push_plain(out: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("{}. ", value));
    }
}

fn push_emphasized(out: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("*{}*. ", value));
    }
}
