//! LaTeX-to-Unicode normalization for BibTeX field values.
//!
//! Scholarly text fields get accent macros decoded, protective braces
//! removed, dashes converted and escaped punctuation unescaped. Locator
//! fields (`url`, `doi`) only lose their `\url{}` wrapper and angle brackets.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Fields whose values are prose and get the full LaTeX cleanup.
pub const SCHOLARLY_FIELDS: &[&str] = &[
    "author",
    "title",
    "journal",
    "booktitle",
    "publisher",
    "institution",
    "howpublished",
    "note",
];

/// Fields that hold a locator and only get wrapper stripping.
pub const LOCATOR_FIELDS: &[&str] = &["url", "doi"];

lazy_static! {
    static ref URL_MACRO: Regex = Regex::new(r"\\url\{([^}]+)\}").unwrap();

    // \'{e}, \'e, \"{o}, \"o, \~{n}, \~n
    static ref ACCENT_MACRO: Regex =
        Regex::new(r#"\\(['"~])(?:\{([A-Za-z])\}|([A-Za-z]))"#).unwrap();

    // \c{c}, \c c
    static ref CEDILLA_MACRO: Regex =
        Regex::new(r"\\c(?:\{([A-Za-z])\}|\s+([A-Za-z]))").unwrap();

    static ref PROTECTED_GROUP: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();

    /// (macro, base letter) -> precomposed letter.
    static ref ACCENTS: HashMap<(char, char), char> = {
        let table: &[(char, &str, &str)] = &[
            ('\'', "aAeEiIoOuUyY", "áÁéÉíÍóÓúÚýÝ"),
            ('"', "aAeEiIoOuU", "äÄëËïÏöÖüÜ"),
            ('~', "nNaAoO", "ñÑãÃõÕ"),
            ('c', "cC", "çÇ"),
        ];

        let mut m = HashMap::new();
        for (accent, bases, composed) in table {
            for (base, out) in bases.chars().zip(composed.chars()) {
                m.insert((*accent, base), out);
            }
        }
        m
    };
}

/// Normalizes a raw field value according to its field name.
///
/// Fields outside [`SCHOLARLY_FIELDS`] and [`LOCATOR_FIELDS`] (year,
/// volume, pages, ...) are returned as-is.
pub fn normalize_field(name: &str, value: &str) -> String {
    if SCHOLARLY_FIELDS.contains(&name) {
        normalize_text(value)
    } else if LOCATOR_FIELDS.contains(&name) {
        normalize_locator(value)
    } else {
        value.to_string()
    }
}

/// Converts LaTeX markup in prose to plain Unicode text.
///
/// # Examples
///
/// ```
/// use citenum::latex::normalize_text;
///
/// assert_eq!(normalize_text(r"Kiddon, Chlo\'{e}"), "Kiddon, Chloé");
/// assert_eq!(normalize_text(r"{Privacy} \& Trust --- a survey"), "Privacy & Trust — a survey");
/// ```
pub fn normalize_text(value: &str) -> String {
    let text = URL_MACRO.replace_all(value, "$1");

    let text = ACCENT_MACRO.replace_all(&text, |caps: &Captures| {
        let accent = caps[1].chars().next().unwrap_or('\'');
        let base = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        compose(accent, base)
    });

    let text = CEDILLA_MACRO.replace_all(&text, |caps: &Captures| {
        let base = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        compose('c', base)
    });

    // One layer only: `{{NASA}}` keeps its outer braces.
    let text = PROTECTED_GROUP.replace_all(&text, "$1");

    text.replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace("\\&", "&")
        .replace("\\_", "_")
        .replace("\\%", "%")
        .replace("\\$", "$")
        .replace("\\#", "#")
}

/// Strips `\url{...}` and surrounding angle brackets from a URL or DOI.
pub fn normalize_locator(value: &str) -> String {
    URL_MACRO
        .replace_all(value, "$1")
        .trim_matches(|c| c == '<' || c == '>')
        .to_string()
}

/// Looks up the precomposed letter; unknown combinations drop the accent.
fn compose(accent: char, base: &str) -> String {
    let mut chars = base.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => ACCENTS
            .get(&(accent, letter))
            .copied()
            .unwrap_or(letter)
            .to_string(),
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acute_braced() {
        assert_eq!(normalize_text(r"Kiddon, Chlo\'{e}"), "Kiddon, Chloé");
    }

    #[test]
    fn test_acute_bare_and_uppercase() {
        assert_eq!(normalize_text(r"\'Elodie and Jos\'e"), "Élodie and José");
    }

    #[test]
    fn test_umlaut_both_forms() {
        // Given: umlauts written with and without braces
        let value = r#"M\"uller and Sch\"{o}n"#;

        // When: we normalize
        let result = normalize_text(value);

        // Then: both are composed
        assert_eq!(result, "Müller and Schön");
    }

    #[test]
    fn test_tilde_and_cedilla() {
        assert_eq!(normalize_text(r"Pe\~{n}a and Fran\c{c}ois"), "Peña and François");
        assert_eq!(normalize_text(r"Gon\c calves"), "Gonçalves");
    }

    #[test]
    fn test_accent_inside_protective_braces() {
        // Given: the common `{\"o}` style
        let value = r#"G{\"o}del"#;

        // When/Then: the accent is decoded and the braces removed
        assert_eq!(normalize_text(value), "Gödel");
    }

    #[test]
    fn test_unknown_accent_letter_drops_accent() {
        assert_eq!(normalize_text(r"\~{x}"), "x");
    }

    #[test]
    fn test_strips_one_layer_of_braces() {
        assert_eq!(normalize_text("{Federated} Learning"), "Federated Learning");
        assert_eq!(normalize_text("{{NASA}} data"), "{NASA} data");
    }

    #[test]
    fn test_dashes() {
        assert_eq!(normalize_text("pre---post"), "pre\u{2014}post");
        assert_eq!(normalize_text("1--10"), "1\u{2013}10");
    }

    #[test]
    fn test_unescapes_punctuation() {
        assert_eq!(
            normalize_text(r"R\&D at 100\% for \$5 \#1 snake\_case"),
            "R&D at 100% for $5 #1 snake_case"
        );
    }

    #[test]
    fn test_url_macro_in_prose() {
        assert_eq!(
            normalize_text(r"Online at \url{https://example.org}"),
            "Online at https://example.org"
        );
    }

    #[test]
    fn test_locator_fields() {
        assert_eq!(
            normalize_field("url", r"\url{https://example.org/a--b}"),
            "https://example.org/a--b"
        );
        assert_eq!(normalize_field("doi", "<10.1000/xyz>"), "10.1000/xyz");
    }

    #[test]
    fn test_other_fields_untouched() {
        assert_eq!(normalize_field("pages", "374--388"), "374--388");
        assert_eq!(normalize_field("year", "2019"), "2019");
    }
}
