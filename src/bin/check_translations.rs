//! Translation completeness report for one product channel.
//!
//! Usage:
//!   cargo run --bin check_translations -- <product> <channel> [section]
//!
//! The section defaults to "listing". Locales come from the catalog; each is
//! reported as complete or with the number of untranslated strings.
//!
//! Environment variables (all optional):
//! - CATALOG_FILE (defaults to data/catalog.json)
//! - LOCALES_ROOT (defaults to locales)
//! - REFERENCE_LOCALE (defaults to en-US)

use anyhow::{bail, Result};
use stores_api::catalog::{Catalog, StaticCatalog};
use stores_api::config::Config;
use stores_api::i18n::{JsonFileParser, TranslationLoader};
use tracing::info;

fn print_usage() {
    println!("Usage: check_translations <product> <channel> [section]");
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check_translations=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_usage();
        return Ok(());
    }

    let config = Config::from_env()?;
    let catalog = StaticCatalog::load(&config.catalog_file)?;

    let product = catalog.updated_product_code(&args[1]);
    let channel = &args[2];
    let section = args.get(3).map(String::as_str).unwrap_or("listing");

    if !catalog.is_supported_channel(&product, channel) {
        bail!("{} is not a supported channel for {}", channel, product);
    }
    let Some(files) = catalog.lang_files(&product, channel, section) else {
        bail!("No {} section for {} ({})", section, product, channel);
    };

    info!("Checking {} files for {} ({})", files.len(), product, channel);

    let loader = TranslationLoader::new(
        JsonFileParser,
        config.locales_root.clone(),
        config.reference_locale.clone(),
    );

    let locales = catalog.store_mozilla_common_locales(&product, channel);
    let mut complete = 0;

    for locale in &locales {
        let translate = loader.translate_files(locale, &files);
        if translate.is_file_translated() {
            complete += 1;
            println!("✓ {}", locale);
        } else {
            let missing = translate
                .source_strings()
                .iter()
                .filter(|key| !translate.is_string_translated(key))
                .count();
            println!(
                "✗ {} ({} of {} strings untranslated)",
                locale,
                missing,
                translate.source_strings().len()
            );
        }
    }

    println!("{}/{} locales complete", complete, locales.len());
    Ok(())
}
