//! Read-through cache of loaded translations.
//!
//! Locale files are deployment artifacts, so entries are never invalidated.

use crate::i18n::metrics::TranslationMetrics;
use crate::i18n::parser::{JsonFileParser, KeyValueParser};
use crate::i18n::translate::{Translate, TranslationLoader};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type CacheKey = (String, Vec<String>);

/// Caches one [`Translate`] per locale and ordered file list.
pub struct TranslationCache<P = JsonFileParser> {
    loader: TranslationLoader<P>,
    entries: RwLock<HashMap<CacheKey, Arc<Translate>>>,
}

impl<P: KeyValueParser> TranslationCache<P> {
    pub fn new(loader: TranslationLoader<P>) -> Self {
        Self {
            loader,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Translation of `files` for `locale`, loading it on first use.
    ///
    /// A single file keeps the parse's activation state; several files are
    /// merged in order.
    pub fn get(&self, locale: &str, files: &[String]) -> Arc<Translate> {
        let key: CacheKey = (locale.to_string(), files.to_vec());
        let metrics = TranslationMetrics::global();

        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            metrics.record_cache_hit();
            return Arc::clone(found);
        }

        metrics.record_cache_miss();
        let translate = Arc::new(match files {
            [file] => self.loader.translate_file(locale, file),
            _ => self.loader.translate_files(locale, files),
        });

        // A concurrent loader may have won the race; keep its entry.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(translate))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
