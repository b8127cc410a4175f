//! Translation lookup and completeness checks.
//!
//! A [`Translate`] pairs the strings of one locale with the keys of the
//! reference (source) locale for the same files. The reference keys are only
//! an oracle for [`Translate::is_file_translated`]; lookups go through the
//! locale's own strings and fall back to the key itself.

use crate::i18n::metrics::TranslationMetrics;
use crate::i18n::parser::{JsonFileParser, KeyValueParser};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Strings parsed from one or more locale files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSet {
    /// Whether the locale file was marked active.
    pub activated: bool,
    pub strings: HashMap<String, String>,
    pub errors: TranslationErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationErrors {
    /// Strings present in the file but skipped by the parser.
    pub ignored_strings: Vec<String>,
}

/// Translated strings of one locale, checked against the reference locale.
#[derive(Debug, Clone)]
pub struct Translate {
    locale: String,
    translations: TranslationSet,
    source_strings: HashSet<String>,
}

impl Translate {
    pub fn new(
        locale: impl Into<String>,
        translations: TranslationSet,
        source_strings: HashSet<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            translations,
            source_strings,
        }
    }

    /// Translated text for `key`, or `key` itself when there is none.
    pub fn get(&self, key: &str) -> String {
        match self.translations.strings.get(key) {
            Some(value) => sanitize(value),
            None => key.to_string(),
        }
    }

    /// A string counts as translated when it exists and differs from its
    /// key, both as stored and as served by [`Translate::get`].
    pub fn is_string_translated(&self, key: &str) -> bool {
        match self.translations.strings.get(key) {
            Some(value) => value != key && sanitize(value) != key,
            None => false,
        }
    }

    /// Every reference string is translated. An empty reference set has
    /// nothing to compare against and never counts as translated.
    pub fn is_file_translated(&self) -> bool {
        if self.source_strings.is_empty() {
            return false;
        }

        self.source_strings
            .iter()
            .all(|key| self.is_string_translated(key))
    }

    /// Every reference key with its lookup result, in key order.
    pub fn reference_strings(&self) -> BTreeMap<String, String> {
        self.source_strings
            .iter()
            .map(|key| (key.clone(), self.get(key)))
            .collect()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn translations(&self) -> &TranslationSet {
        &self.translations
    }

    pub fn source_strings(&self) -> &HashSet<String> {
        &self.source_strings
    }
}

/// Values are served without surrounding whitespace.
fn sanitize(value: &str) -> String {
    value.trim().to_string()
}

/// Builds [`Translate`] values from locale files on disk.
///
/// Files live at `{root}/{locale}/{file}`; the reference locale provides the
/// source keys. A file that can't be read or parsed is treated as empty.
#[derive(Debug, Clone)]
pub struct TranslationLoader<P = JsonFileParser> {
    parser: P,
    root: PathBuf,
    reference_locale: String,
}

impl<P: KeyValueParser> TranslationLoader<P> {
    pub fn new(parser: P, root: impl Into<PathBuf>, reference_locale: impl Into<String>) -> Self {
        Self {
            parser,
            root: root.into(),
            reference_locale: reference_locale.into(),
        }
    }

    /// Load one file. Activation and ignored strings come from the parse.
    pub fn translate_file(&self, locale: &str, file: &str) -> Translate {
        let translations = self.parse_or_empty(locale, file);
        let source_strings = self
            .parse_or_empty(&self.reference_locale, file)
            .strings
            .into_keys()
            .collect();

        Translate::new(locale, translations, source_strings)
    }

    /// Load several files and merge them in order; a later file overrides an
    /// earlier one on a shared key. The merged set is never activated and
    /// carries no ignored strings.
    pub fn translate_files(&self, locale: &str, files: &[String]) -> Translate {
        let mut strings = HashMap::new();
        let mut source_strings = HashSet::new();

        for file in files {
            strings.extend(self.parse_or_empty(locale, file).strings);
            source_strings.extend(
                self.parse_or_empty(&self.reference_locale, file)
                    .strings
                    .into_keys(),
            );
        }

        let translations = TranslationSet {
            activated: false,
            strings,
            errors: Default::default(),
        };

        Translate::new(locale, translations, source_strings)
    }

    fn parse_or_empty(&self, locale: &str, file: &str) -> TranslationSet {
        let path = self.root.join(locale).join(file);
        let metrics = TranslationMetrics::global();

        match self.parser.parse(&path) {
            Ok(set) => {
                metrics.record_file_parsed();
                debug!("Parsed {} strings from {}", set.strings.len(), path.display());
                set
            }
            Err(e) => {
                metrics.record_parse_failure();
                warn!("{}", e);
                TranslationSet::default()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::TempDir;

    fn translate(strings: &[(&str, &str)], source: &[&str]) -> Translate {
        let translations = TranslationSet {
            strings: strings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..TranslationSet::default()
        };
        Translate::new(
            "fr",
            translations,
            source.iter().map(|k| k.to_string()).collect(),
        )
    }

    /// Write `{root}/{locale}/{file}` with a flat JSON object.
    pub(crate) fn write_locale_file(root: &Path, locale: &str, file: &str, strings: &[(&str, &str)]) {
        let path = root.join(locale).join(file);
        std::fs::create_dir_all(path.parent().expect("locale file has a parent"))
            .expect("Failed to create locale dir");
        let map: BTreeMap<&str, &str> = strings.iter().copied().collect();
        std::fs::write(&path, serde_json::to_string(&map).expect("serialize"))
            .expect("Failed to write locale file");
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_get_translated() {
        let t = translate(&[("Hello", "Bonjour")], &["Hello"]);
        assert_eq!(t.get("Hello"), "Bonjour");
    }

    #[test]
    fn test_get_missing_returns_key() {
        let t = translate(&[("Hello", "Bonjour")], &["Hello"]);
        assert_eq!(t.get("Goodbye"), "Goodbye");
    }

    #[test]
    fn test_get_trims_value() {
        let t = translate(&[("Hello", "  Bonjour \n")], &["Hello"]);
        assert_eq!(t.get("Hello"), "Bonjour");
    }

    // ==================== String Completeness Tests ====================

    #[test]
    fn test_string_translated() {
        let t = translate(&[("Hello", "Bonjour")], &[]);
        assert!(t.is_string_translated("Hello"));
    }

    #[test]
    fn test_string_missing_is_untranslated() {
        let t = translate(&[], &[]);
        assert!(!t.is_string_translated("Hello"));
    }

    #[test]
    fn test_string_identical_is_untranslated() {
        let t = translate(&[("Firefox", "Firefox")], &[]);
        assert!(!t.is_string_translated("Firefox"));
    }

    #[test]
    fn test_string_translated_agrees_with_get() {
        let t = translate(
            &[("Hello", "Bonjour"), ("Firefox", "Firefox"), ("Tab", " Tab ")],
            &[],
        );
        for key in ["Hello", "Firefox", "Tab", "Missing"] {
            let exists = t.translations().strings.contains_key(key);
            assert_eq!(t.is_string_translated(key), exists && t.get(key) != key, "{key}");
        }
    }

    #[test]
    fn test_string_identical_with_padded_key_is_untranslated() {
        let t = translate(&[("Hello ", "Hello ")], &["Hello "]);
        assert_eq!(t.get("Hello "), "Hello");
        assert!(!t.is_string_translated("Hello "));
        assert!(!t.is_file_translated());
    }

    #[test]
    fn test_string_trimmed_to_key_is_untranslated() {
        let t = translate(&[("Hello", "  Hello\n")], &["Hello"]);
        assert!(!t.is_string_translated("Hello"));
    }

    // ==================== File Completeness Tests ====================

    #[test]
    fn test_file_translated() {
        let t = translate(&[("Hello", "Bonjour"), ("Bye", "Salut")], &["Hello", "Bye"]);
        assert!(t.is_file_translated());
    }

    #[test]
    fn test_file_empty_reference_is_untranslated() {
        let t = translate(&[("Hello", "Bonjour")], &[]);
        assert!(!t.is_file_translated());
    }

    #[test]
    fn test_file_missing_one_string() {
        let t = translate(&[("Hello", "Bonjour")], &["Hello", "Bye"]);
        assert!(!t.is_file_translated());
    }

    #[test]
    fn test_file_identical_string_flips_result() {
        let t = translate(&[("Hello", "Bonjour"), ("Bye", "Bye")], &["Hello", "Bye"]);
        assert!(!t.is_file_translated());
    }

    #[test]
    fn test_file_extra_strings_ignored() {
        let t = translate(&[("Hello", "Bonjour"), ("Extra", "En plus")], &["Hello"]);
        assert!(t.is_file_translated());
    }

    #[test]
    fn test_reference_strings_fall_back() {
        let t = translate(&[("Hello", "Bonjour")], &["Hello", "Bye"]);
        let strings = t.reference_strings();
        assert_eq!(strings["Hello"], "Bonjour");
        assert_eq!(strings["Bye"], "Bye");
    }

    // ==================== Loader Tests ====================

    #[test]
    #[serial(metrics)]
    fn test_translate_file_from_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_locale_file(root, "en-US", "page.json", &[("Hello", "Hello"), ("Bye", "Bye")]);
        write_locale_file(root, "fr", "page.json", &[("Hello", "Bonjour"), ("Bye", "Salut")]);

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let t = loader.translate_file("fr", "page.json");

        assert_eq!(t.locale(), "fr");
        assert_eq!(t.source_strings().len(), 2);
        assert!(t.is_file_translated());
    }

    #[test]
    #[serial(metrics)]
    fn test_translate_file_keeps_activation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("de")).unwrap();
        std::fs::write(
            root.join("de").join("page.json"),
            r#"{"activated": true, "strings": {"Hello": "Hallo"}, "ignored_strings": ["Old"]}"#,
        )
        .unwrap();

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let t = loader.translate_file("de", "page.json");

        assert!(t.translations().activated);
        assert_eq!(t.translations().errors.ignored_strings, vec!["Old"]);
    }

    #[test]
    #[serial(metrics)]
    fn test_translate_missing_locale_is_untranslated() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_locale_file(root, "en-US", "page.json", &[("Hello", "Hello")]);

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let t = loader.translate_file("it", "page.json");

        assert!(t.translations().strings.is_empty());
        assert_eq!(t.get("Hello"), "Hello");
        assert!(!t.is_file_translated());
    }

    #[test]
    #[serial(metrics)]
    fn test_translate_unparsable_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_locale_file(root, "en-US", "page.json", &[("Hello", "Hello")]);
        std::fs::create_dir_all(root.join("fr")).unwrap();
        std::fs::write(root.join("fr").join("page.json"), "{ broken").unwrap();

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let t = loader.translate_file("fr", "page.json");

        assert!(t.translations().strings.is_empty());
        assert!(!t.is_file_translated());
    }

    #[test]
    #[serial(metrics)]
    fn test_translate_files_merge_later_wins() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_locale_file(root, "en-US", "a.json", &[("Hello", "Hello"), ("Title", "Title")]);
        write_locale_file(root, "en-US", "b.json", &[("Bye", "Bye")]);
        write_locale_file(root, "fr", "a.json", &[("Hello", "Bonjour"), ("Title", "Titre A")]);
        write_locale_file(root, "fr", "b.json", &[("Bye", "Salut"), ("Title", "Titre B")]);

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let files = vec!["a.json".to_string(), "b.json".to_string()];
        let t = loader.translate_files("fr", &files);

        assert_eq!(t.get("Title"), "Titre B");
        assert_eq!(t.source_strings().len(), 3);
        assert!(t.is_file_translated());
        assert!(!t.translations().activated);
        assert!(t.translations().errors.ignored_strings.is_empty());
    }

    #[test]
    #[serial(metrics)]
    fn test_translate_files_partial_locale() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_locale_file(root, "en-US", "a.json", &[("Hello", "Hello")]);
        write_locale_file(root, "en-US", "b.json", &[("Bye", "Bye")]);
        write_locale_file(root, "fr", "a.json", &[("Hello", "Bonjour")]);

        let loader = TranslationLoader::new(JsonFileParser, root, "en-US");
        let files = vec!["a.json".to_string(), "b.json".to_string()];
        let t = loader.translate_files("fr", &files);

        assert!(t.is_string_translated("Hello"));
        assert!(!t.is_string_translated("Bye"));
        assert!(!t.is_file_translated());
    }
}
