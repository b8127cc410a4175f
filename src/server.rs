use crate::api::{ApiError, ApiRequest, ApiVersions, ParsedUrl, Service, StructuredQuery};
use crate::catalog::{Catalog, StaticCatalog};
use crate::config::Config;
use crate::i18n::{JsonFileParser, TranslationCache, TranslationLoader, TranslationMetrics};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Catalog section holding the store listing strings.
pub const LISTING_SECTION: &str = "listing";

pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub versions: ApiVersions,
    pub translations: TranslationCache,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, versions: ApiVersions, translations: TranslationCache) -> Self {
        Self {
            catalog,
            versions,
            translations,
        }
    }

    /// Load the catalog and set up translation loading from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = StaticCatalog::load(&config.catalog_file)?;
        let loader = TranslationLoader::new(
            JsonFileParser,
            config.locales_root.clone(),
            config.reference_locale.clone(),
        );

        Ok(Self::new(
            Arc::new(catalog),
            config.api_versions(),
            TranslationCache::new(loader),
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api", get(api_call))
        .route("/api/*path", get(api_call))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the process is stopped.
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("Server error")
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics() -> impl IntoResponse {
    Json(TranslationMetrics::global().report())
}

/// `/api/` has an empty tail, which the wildcard route does not match.
async fn fallback(state: State<SharedState>, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return api_call(state, uri).await;
    }
    StatusCode::NOT_FOUND.into_response()
}

async fn api_call(State(state): State<SharedState>, uri: Uri) -> Response {
    let url = ParsedUrl::new(uri.path(), uri.query().map(str::to_string));

    let (validated, legacy, current_version) = {
        let request = ApiRequest::new(&url, state.catalog.as_ref(), &state.versions);
        let validated = request
            .validated()
            .map(|(service, query)| (service, query.clone()))
            .map_err(ApiError::from);
        (
            validated,
            request.is_legacy_call(),
            request.current_api_version().to_string(),
        )
    };

    let mut response = match validated {
        Ok((service, query)) => {
            let task_state = Arc::clone(&state);
            // Locale files are read from disk
            match tokio::task::spawn_blocking(move || dispatch(&task_state, service, &query)).await
            {
                Ok(body) => Json(body).into_response(),
                Err(e) => {
                    error!("Dispatch of {} failed: {}", service, e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiError {
                            error: "Internal server error".to_string(),
                        }),
                    )
                        .into_response()
                }
            }
        }
        Err(api_error) => api_error.into_response(),
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&current_version) {
        headers.insert("x-api-version", value);
    }
    if legacy {
        headers.insert("deprecation", HeaderValue::from_static("true"));
    }

    response
}

/// Build the response body of a validated call.
pub fn dispatch(state: &AppState, service: Service, query: &StructuredQuery) -> Value {
    let catalog = state.catalog.as_ref();
    let channel = query.channel.as_deref().unwrap_or_default();

    match service {
        Service::FirefoxLocales | Service::SupportedLocales => {
            json!(catalog.store_mozilla_common_locales(&query.product, channel))
        }
        Service::StoreLocales => json!(catalog.store_locales(&query.store)),
        Service::LocalesMapping => json!(catalog.locales_mapping(&query.store)),
        Service::Translation => {
            let locale = query.locale.as_deref().unwrap_or_default();
            let files = section_files(catalog, query, LISTING_SECTION);
            json!(state.translations.get(locale, &files).reference_strings())
        }
        Service::Listing => json!(section_strings(state, query, LISTING_SECTION)),
        Service::Whatsnew => json!(section_strings(state, query, crate::api::WHATSNEW_SECTION)),
        Service::Done => {
            let files = section_files(catalog, query, LISTING_SECTION);
            let done: Vec<String> = catalog
                .store_mozilla_common_locales(&query.product, channel)
                .into_iter()
                .filter(|locale| state.translations.get(locale, &files).is_file_translated())
                .collect();
            json!(done)
        }
    }
}

fn section_files(catalog: &dyn Catalog, query: &StructuredQuery, section: &str) -> Vec<String> {
    let channel = query.channel.as_deref().unwrap_or_default();
    catalog
        .lang_files(&query.product, channel, section)
        .unwrap_or_default()
}

/// Strings of a section for every locale the product ships on this channel.
fn section_strings(
    state: &AppState,
    query: &StructuredQuery,
    section: &str,
) -> BTreeMap<String, BTreeMap<String, String>> {
    let catalog = state.catalog.as_ref();
    let channel = query.channel.as_deref().unwrap_or_default();
    let files = section_files(catalog, query, section);

    catalog
        .store_mozilla_common_locales(&query.product, channel)
        .into_iter()
        .map(|locale| {
            let strings = state.translations.get(&locale, &files).reference_strings();
            (locale, strings)
        })
        .collect()
}
