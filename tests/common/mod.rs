//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

/// A small bibliography exercising each entry type the formatter knows.
pub const SAMPLE_BIB: &str = r#"
@comment{ Generated for tests }

@article{smith2020,
  author = {Smith, J. and Doe, A.},
  title = {A Study},
  journal = {J. Things},
  year = {2020}
}

@inproceedings{mcmahan2017,
  author = {McMahan, Brendan and Moore, Eider},
  title = {Communication-Efficient Learning of Deep Networks from Decentralized Data},
  booktitle = {Proceedings of {AISTATS}},
  pages = {1273--1282},
  year = {2017},
  doi = {10.48550/arXiv.1602.05629}
}

@misc{gdpr2016,
  title = {General Data Protection Regulation},
  howpublished = {Official Journal of the European Union},
  year = {2016},
  url = {\url{https://eur-lex.europa.eu/eli/reg/2016/679/oj}}
}

@techreport{kiddon2021,
  author = {Kiddon, Chlo\'{e}},
  title = {Privacy {\&} Federated Analytics},
  institution = {Example Labs},
  year = {2021}
}
"#;

/// Build a BibTeX string of minimal `@misc` entries from a list of keys.
///
/// Each entry gets the title `Title {key}` and the year 2020.
pub fn build_bib(keys: &[&str]) -> String {
    keys.iter()
        .map(|key| format!("@misc{{{},\n  title = {{Title {}}},\n  year = {{2020}}\n}}\n", key, key))
        .collect()
}
