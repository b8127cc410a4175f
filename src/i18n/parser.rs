//! Locale file parsing.
//!
//! The engine only needs key/value pairs out of a locale file, so parsing is
//! hidden behind [`KeyValueParser`]. [`JsonFileParser`] reads JSON locale files.

use crate::i18n::translate::{TranslationErrors, TranslationSet};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns a locale file into a [`TranslationSet`].
pub trait KeyValueParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<TranslationSet, ParseError>;
}

/// Parser for JSON locale files.
///
/// Accepts either a flat object of `key: translation` pairs or the full form
/// `{"activated": true, "strings": {...}, "ignored_strings": [...]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileParser;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLocaleFile {
    Full {
        #[serde(default)]
        activated: bool,
        strings: HashMap<String, String>,
        #[serde(default)]
        ignored_strings: Vec<String>,
    },
    Flat(HashMap<String, String>),
}

impl JsonFileParser {
    pub fn parse_str(&self, content: &str, path: &Path) -> Result<TranslationSet, ParseError> {
        let file: JsonLocaleFile =
            serde_json::from_str(content).map_err(|source| ParseError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(match file {
            JsonLocaleFile::Full {
                activated,
                strings,
                ignored_strings,
            } => TranslationSet {
                activated,
                strings,
                errors: TranslationErrors { ignored_strings },
            },
            JsonLocaleFile::Flat(strings) => TranslationSet {
                strings,
                ..TranslationSet::default()
            },
        })
    }
}

impl KeyValueParser for JsonFileParser {
    fn parse(&self, path: &Path) -> Result<TranslationSet, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<TranslationSet, ParseError> {
        JsonFileParser.parse_str(content, Path::new("fr/page.json"))
    }

    #[test]
    fn test_parse_flat_file() {
        let set = parse(r#"{"Hello": "Bonjour", "Bye": "Au revoir"}"#).unwrap();
        assert_eq!(set.strings.len(), 2);
        assert_eq!(set.strings["Hello"], "Bonjour");
        assert!(!set.activated);
        assert!(set.errors.ignored_strings.is_empty());
    }

    #[test]
    fn test_parse_full_file() {
        let set = parse(
            r#"{
                "activated": true,
                "strings": {"Hello": "Bonjour"},
                "ignored_strings": ["Obsolete"]
            }"#,
        )
        .unwrap();
        assert!(set.activated);
        assert_eq!(set.strings["Hello"], "Bonjour");
        assert_eq!(set.errors.ignored_strings, vec!["Obsolete"]);
    }

    #[test]
    fn test_parse_flat_file_with_strings_key() {
        let set = parse(r#"{"strings": "chaînes"}"#).unwrap();
        assert_eq!(set.strings["strings"], "chaînes");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse("not json").unwrap_err();
        assert!(matches!(err, ParseError::Format { .. }));
        assert!(err.to_string().contains("fr/page.json"));
    }

    #[test]
    fn test_parse_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = JsonFileParser
            .parse(&temp_dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_parse_file_from_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("page.json");
        std::fs::write(&path, r#"{"Hello": "Hallo"}"#).expect("Failed to write locale file");

        let set = JsonFileParser.parse(&path).unwrap();
        assert_eq!(set.strings["Hello"], "Hallo");
    }
}
