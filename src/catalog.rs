//! Catalog registry: products, stores, channels and their locales.
//!
//! Request validation consults the registry through the [`Catalog`] trait.
//! [`StaticCatalog`] is the file-backed implementation used by the server; it
//! is loaded once at startup and is immutable afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only view of the product catalog.
pub trait Catalog: Send + Sync {
    /// Resolve a product identifier to its canonical code.
    ///
    /// Legacy aliases map to the product they were renamed to. Unknown
    /// identifiers are returned unchanged.
    fn updated_product_code(&self, id: &str) -> String;

    /// Store the product is distributed through.
    fn product_store(&self, product: &str) -> Option<String>;

    /// Channels the product ships on.
    fn product_channels(&self, product: &str) -> Vec<String>;

    fn supported_products(&self) -> Vec<String>;

    fn supported_stores(&self) -> Vec<String>;

    /// Catalog locales supported for a product on a channel.
    fn store_mozilla_common_locales(&self, product: &str, channel: &str) -> Vec<String>;

    /// Lang files registered for a content section, `None` if the section
    /// does not exist for this product and channel.
    fn lang_files(&self, product: &str, channel: &str, section: &str) -> Option<Vec<String>>;

    /// Locale codes as the store itself names them.
    fn store_locales(&self, store: &str) -> Vec<String>;

    /// Store locale code to catalog locale code.
    fn locales_mapping(&self, store: &str) -> BTreeMap<String, String>;

    fn is_supported_product(&self, product: &str) -> bool {
        self.supported_products().iter().any(|p| p == product)
    }

    fn is_supported_store(&self, store: &str) -> bool {
        self.supported_stores().iter().any(|s| s == store)
    }

    fn is_supported_channel(&self, product: &str, channel: &str) -> bool {
        self.product_channels(product).iter().any(|c| c == channel)
    }

    fn is_supported_locale(&self, product: &str, channel: &str, locale: &str) -> bool {
        self.store_mozilla_common_locales(product, channel)
            .iter()
            .any(|l| l == locale)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoreEntry {
    #[serde(default)]
    locales_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProductEntry {
    store: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    channels: BTreeMap<String, ChannelEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChannelEntry {
    #[serde(default)]
    locales: Vec<String>,
    /// Section name (e.g. "listing", "whatsnew") to lang files.
    #[serde(default)]
    sections: BTreeMap<String, Vec<String>>,
}

/// Catalog loaded from a JSON document.
///
/// ```json
/// {
///   "stores": { "google": { "locales_mapping": { "fr-FR": "fr" } } },
///   "products": {
///     "fx_android": {
///       "store": "google",
///       "aliases": ["firefox_android"],
///       "channels": {
///         "beta": {
///           "locales": ["fr"],
///           "sections": { "listing": ["fx_android/description_beta_page.lang"] }
///         }
///       }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    stores: BTreeMap<String, StoreEntry>,
    #[serde(default)]
    products: BTreeMap<String, ProductEntry>,
}

impl StaticCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse catalog JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&content)
    }

    fn channel(&self, product: &str, channel: &str) -> Option<&ChannelEntry> {
        self.products.get(product)?.channels.get(channel)
    }
}

impl Catalog for StaticCatalog {
    fn updated_product_code(&self, id: &str) -> String {
        if self.products.contains_key(id) {
            return id.to_string();
        }

        self.products
            .iter()
            .find(|(_, entry)| entry.aliases.iter().any(|alias| alias == id))
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn product_store(&self, product: &str) -> Option<String> {
        self.products.get(product).map(|entry| entry.store.clone())
    }

    fn product_channels(&self, product: &str) -> Vec<String> {
        self.products
            .get(product)
            .map(|entry| entry.channels.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn supported_products(&self) -> Vec<String> {
        self.products.keys().cloned().collect()
    }

    fn supported_stores(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    fn store_mozilla_common_locales(&self, product: &str, channel: &str) -> Vec<String> {
        self.channel(product, channel)
            .map(|entry| entry.locales.clone())
            .unwrap_or_default()
    }

    fn lang_files(&self, product: &str, channel: &str, section: &str) -> Option<Vec<String>> {
        self.channel(product, channel)?
            .sections
            .get(section)
            .filter(|files| !files.is_empty())
            .cloned()
    }

    fn store_locales(&self, store: &str) -> Vec<String> {
        self.stores
            .get(store)
            .map(|entry| entry.locales_mapping.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn locales_mapping(&self, store: &str) -> BTreeMap<String, String> {
        self.stores
            .get(store)
            .map(|entry| entry.locales_mapping.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Catalog shared by the request tests.
    pub(crate) fn sample_catalog() -> StaticCatalog {
        StaticCatalog::from_json(
            r#"{
                "stores": {
                    "google": { "locales_mapping": { "fr-FR": "fr", "de-DE": "de" } },
                    "apple": { "locales_mapping": { "fr-FR": "fr", "ja": "ja" } }
                },
                "products": {
                    "fx_android": {
                        "store": "google",
                        "aliases": ["firefox_android"],
                        "channels": {
                            "beta": {
                                "locales": ["fr", "de"],
                                "sections": {
                                    "listing": ["fx_android/description_beta_page.lang"],
                                    "whatsnew": ["fx_android/whatsnew/android_beta.lang"]
                                }
                            },
                            "release": {
                                "locales": ["fr", "de", "it"],
                                "sections": {
                                    "listing": ["fx_android/description_release_page.lang"]
                                }
                            }
                        }
                    },
                    "fx_ios": {
                        "store": "apple",
                        "channels": {
                            "release": { "locales": ["fr", "ja"] }
                        }
                    }
                }
            }"#,
        )
        .expect("sample catalog parses")
    }

    // ==================== Product Resolution Tests ====================

    #[test]
    fn test_updated_product_code_canonical() {
        let catalog = sample_catalog();
        assert_eq!(catalog.updated_product_code("fx_android"), "fx_android");
    }

    #[test]
    fn test_updated_product_code_alias() {
        let catalog = sample_catalog();
        assert_eq!(catalog.updated_product_code("firefox_android"), "fx_android");
    }

    #[test]
    fn test_updated_product_code_unknown_passthrough() {
        let catalog = sample_catalog();
        assert_eq!(catalog.updated_product_code("thunderbird"), "thunderbird");
    }

    #[test]
    fn test_product_store() {
        let catalog = sample_catalog();
        assert_eq!(catalog.product_store("fx_ios").as_deref(), Some("apple"));
        assert_eq!(catalog.product_store("thunderbird"), None);
    }

    // ==================== Channel and Locale Tests ====================

    #[test]
    fn test_product_channels() {
        let catalog = sample_catalog();
        assert_eq!(catalog.product_channels("fx_android"), vec!["beta", "release"]);
        assert!(catalog.product_channels("unknown").is_empty());
    }

    #[test]
    fn test_supported_locale_checks() {
        let catalog = sample_catalog();
        assert!(catalog.is_supported_locale("fx_android", "release", "it"));
        assert!(!catalog.is_supported_locale("fx_android", "beta", "it"));
        assert!(!catalog.is_supported_locale("fx_android", "nightly", "fr"));
    }

    #[test]
    fn test_lang_files_by_section() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.lang_files("fx_android", "beta", "whatsnew"),
            Some(vec!["fx_android/whatsnew/android_beta.lang".to_string()])
        );
        assert_eq!(catalog.lang_files("fx_android", "release", "whatsnew"), None);
    }

    // ==================== Store Tests ====================

    #[test]
    fn test_supported_stores() {
        let catalog = sample_catalog();
        assert!(catalog.is_supported_store("apple"));
        assert!(catalog.is_supported_store("google"));
        assert!(!catalog.is_supported_store("amazon"));
    }

    #[test]
    fn test_store_locales_and_mapping() {
        let catalog = sample_catalog();
        assert_eq!(catalog.store_locales("apple"), vec!["fr-FR", "ja"]);
        assert_eq!(
            catalog.locales_mapping("google").get("de-DE").map(String::as_str),
            Some("de")
        );
        assert!(catalog.locales_mapping("amazon").is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(StaticCatalog::from_json("not json").is_err());
    }
}
