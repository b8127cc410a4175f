//! Translation metrics and observability module.
//!
//! Counts how often parsed locale files are served from cache and how many
//! locale files were parsed or failed to parse.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global translation metrics singleton.
pub struct TranslationMetrics {
    /// Number of times a translation was found in the cache
    cache_hits: AtomicUsize,

    /// Number of times a translation had to be loaded
    cache_misses: AtomicUsize,

    /// Number of locale files parsed successfully
    files_parsed: AtomicUsize,

    /// Number of locale files that were missing or unparsable
    parse_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl TranslationMetrics {
    /// Get the global translation metrics instance.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(|| TranslationMetrics {
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            files_parsed: AtomicUsize::new(0),
            parse_failures: AtomicUsize::new(0),
        })
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_parsed(&self) {
        self.files_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn files_parsed(&self) -> usize {
        self.files_parsed.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> usize {
        self.parse_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let parsed = self.files_parsed();
        let failures = self.parse_failures();
        let total_files = parsed + failures;
        let parse_failure_rate = if total_files > 0 {
            (failures as f64 / total_files as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            files_parsed: parsed,
            parse_failures: failures,
            parse_failure_rate,
        }
    }

    /// Reset all metrics to zero (useful for testing).
    #[cfg(test)]
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.files_parsed.store(0, Ordering::Relaxed);
        self.parse_failures.store(0, Ordering::Relaxed);
    }
}

/// Metrics report containing current translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub files_parsed: usize,
    pub parse_failures: usize,

    /// Share of locale file reads that failed, as a percentage (0-100)
    pub parse_failure_rate: f64,
}
