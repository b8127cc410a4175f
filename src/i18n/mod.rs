//! Translation lookup for store metadata.
//!
//! Locale files are stored as `{root}/{locale}/{file}`. Each lookup pairs a
//! locale's strings with the reference locale's keys, so callers can both
//! fetch translated text and ask whether a file set is complete.
//!
//! # Architecture
//!
//! - `parser`: the key/value locale file parser seam and its JSON implementation
//! - `translate`: translation sets, lookups and completeness checks
//! - `cache`: read-through cache keyed by locale and file list
//! - `metrics`: cache and parse counters
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{JsonFileParser, TranslationLoader};
//!
//! let loader = TranslationLoader::new(JsonFileParser, "locales", "en-US");
//! let fr = loader.translate_file("fr", "fx_android/description_release_page.lang");
//! if fr.is_file_translated() {
//!     println!("{}", fr.get("Firefox Browser"));
//! }
//! ```

mod cache;
mod metrics;
mod parser;
mod translate;

pub use cache::TranslationCache;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use parser::{JsonFileParser, KeyValueParser, ParseError};
pub use translate::{Translate, TranslationErrors, TranslationLoader, TranslationSet};
