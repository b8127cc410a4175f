use crate::api::ApiVersions;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Locale files
    pub locales_root: PathBuf,
    pub reference_locale: String,

    // Catalog registry
    pub catalog_file: PathBuf,

    // API versions, oldest first
    pub supported_api_versions: Vec<String>,
    pub current_api_version: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let supported_api_versions = parse_versions(
            &std::env::var("API_VERSIONS").unwrap_or_else(|_| "v1".to_string()),
        );
        if supported_api_versions.is_empty() {
            bail!("API_VERSIONS must list at least one version");
        }

        let current_api_version = match std::env::var("CURRENT_API_VERSION") {
            Ok(version) => version,
            // Newest listed version
            Err(_) => supported_api_versions
                .last()
                .cloned()
                .context("API_VERSIONS is empty")?,
        };

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            locales_root: std::env::var("LOCALES_ROOT")
                .unwrap_or_else(|_| "locales".to_string())
                .into(),
            reference_locale: std::env::var("REFERENCE_LOCALE")
                .unwrap_or_else(|_| "en-US".to_string()),

            catalog_file: std::env::var("CATALOG_FILE")
                .unwrap_or_else(|_| "data/catalog.json".to_string())
                .into(),

            supported_api_versions,
            current_api_version,
        })
    }

    /// Build the version registry used by request validation.
    pub fn api_versions(&self) -> ApiVersions {
        ApiVersions::new(
            self.supported_api_versions.clone(),
            self.current_api_version.clone(),
        )
    }
}

/// Split a comma-separated version list, dropping blanks.
fn parse_versions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
