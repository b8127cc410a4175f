use anyhow::Result;
use stores_api::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stores_api=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting store metadata API");

    let config = config::Config::from_env()?;
    info!(
        "API versions {:?} (current {}), locales from {}",
        config.supported_api_versions,
        config.current_api_version,
        config.locales_root.display()
    );

    server::serve(&config).await
}
