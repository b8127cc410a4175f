//! Request validation pipeline.
//!
//! [`ApiRequest`] decodes a URL, classifies it and runs the checks below in
//! order, stopping at the first failure:
//!
//! 1. something follows the API marker
//! 2. at least one parameter remains once the version is stripped
//! 3. the requested API version is supported
//! 4. the product (product queries) or store (store queries) is supported
//! 5. the service name is known
//! 6. the service's own structural and catalog checks
//!
//! The outcome is computed once at construction and never changes.

use crate::api::params::{
    extract_path_parameters, extract_query_parameters, ApiVersions, ParsedUrl, PathParameters,
    QueryParameters,
};
use crate::api::query::{QueryType, Service, StructuredQuery};
use crate::catalog::Catalog;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Catalog section whose presence enables the whatsnew service.
pub const WHATSNEW_SECTION: &str = "whatsnew";

/// Why a request was rejected. The display text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error("No service requested")]
    NoService,

    #[error("Not enough parameters for this query ({required} required, {given} given)")]
    NotEnoughParameters { required: usize, given: usize },

    #[error("API version {0} is not supported")]
    UnsupportedApiVersion(String),

    #[error("{0} is not a supported product")]
    UnsupportedProduct(String),

    #[error("{0} is not a supported store")]
    UnsupportedStore(String),

    #[error("{0} is not a valid service")]
    UnknownService(String),

    #[error("{channel} is not a supported channel for {product}")]
    UnsupportedChannel { product: String, channel: String },

    #[error("{locale} is not a supported locale for {product} ({channel})")]
    UnsupportedLocale {
        product: String,
        channel: String,
        locale: String,
    },

    #[error("Whatsnew section is not supported for {product} ({channel})")]
    WhatsnewNotSupported { product: String, channel: String },
}

/// Error payload returned with a 400 status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl From<&InvalidRequest> for ApiError {
    fn from(err: &InvalidRequest) -> Self {
        ApiError {
            error: err.to_string(),
        }
    }
}

/// One incoming API call, decoded and validated.
pub struct ApiRequest<'a> {
    versions: &'a ApiVersions,
    parameters: PathParameters,
    query_parameters: QueryParameters,
    query: StructuredQuery,
    api_version: String,
    verdict: Result<Service, InvalidRequest>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(url: &ParsedUrl, catalog: &dyn Catalog, versions: &'a ApiVersions) -> Self {
        let parameters = extract_path_parameters(&url.path);
        let query_parameters = url
            .query
            .as_deref()
            .map(extract_query_parameters)
            .unwrap_or_default();

        let api_version = match parameters.detected_version() {
            Some(version) => version.to_string(),
            None => {
                debug!("Unversioned API call to {}", url.path);
                versions.default_version().to_string()
            }
        };

        let query = StructuredQuery::classify(&parameters, catalog);
        let verdict = validate(&parameters, &query, &api_version, catalog, versions);

        if let Err(err) = &verdict {
            warn!("Invalid API call {}: {}", url.path, err);
        }

        Self {
            versions,
            parameters,
            query_parameters,
            query,
            api_version,
            verdict,
        }
    }

    pub fn is_valid_request(&self) -> bool {
        self.verdict.is_ok()
    }

    /// The service and query to dispatch, or the reason the call was rejected.
    pub fn validated(&self) -> Result<(Service, &StructuredQuery), &InvalidRequest> {
        self.verdict.as_ref().map(|service| (*service, &self.query))
    }

    /// Requested service, `None` when the request is invalid.
    pub fn get_service(&self) -> Option<Service> {
        self.verdict.as_ref().ok().copied()
    }

    /// Error payload for an invalid request, `None` when it is valid.
    pub fn invalid_api_call(&self) -> Option<ApiError> {
        self.verdict.as_ref().err().map(ApiError::from)
    }

    pub fn error(&self) -> Option<&InvalidRequest> {
        self.verdict.as_ref().err()
    }

    pub fn query(&self) -> &StructuredQuery {
        &self.query
    }

    pub fn query_parameters(&self) -> &QueryParameters {
        &self.query_parameters
    }

    /// Version this call is served with (requested or defaulted).
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn is_legacy_call(&self) -> bool {
        self.parameters.is_legacy()
    }

    pub fn is_supported_api_version(&self) -> bool {
        self.versions.is_supported(&self.api_version)
    }

    /// Newest version of the API, whatever this call requested.
    pub fn current_api_version(&self) -> &str {
        self.versions.current()
    }
}

fn validate(
    parameters: &PathParameters,
    query: &StructuredQuery,
    api_version: &str,
    catalog: &dyn Catalog,
    versions: &ApiVersions,
) -> Result<Service, InvalidRequest> {
    if !parameters.has_segments() {
        return Err(InvalidRequest::NoService);
    }

    ensure_parameters(parameters, 1)?;

    if !versions.is_supported(api_version) {
        return Err(InvalidRequest::UnsupportedApiVersion(api_version.to_string()));
    }

    match query.query_type {
        QueryType::Product if !catalog.is_supported_product(&query.product) => {
            return Err(InvalidRequest::UnsupportedProduct(query.product.clone()));
        }
        QueryType::Store if !catalog.is_supported_store(&query.store) => {
            return Err(InvalidRequest::UnsupportedStore(query.store.clone()));
        }
        _ => {}
    }

    ensure_parameters(parameters, 2)?;
    let service = Service::from_name(&query.service)
        .ok_or_else(|| InvalidRequest::UnknownService(query.service.clone()))?;

    if let Some(successor) = service.successor() {
        warn!("{} is deprecated, use {} instead", service, successor);
    }

    validate_service(service, parameters, query, catalog)?;

    Ok(service)
}

fn validate_service(
    service: Service,
    parameters: &PathParameters,
    query: &StructuredQuery,
    catalog: &dyn Catalog,
) -> Result<(), InvalidRequest> {
    ensure_parameters(parameters, service.min_parameters())?;

    match service {
        Service::LocalesMapping | Service::StoreLocales => Ok(()),
        Service::FirefoxLocales | Service::SupportedLocales | Service::Done | Service::Listing => {
            ensure_channel(query, catalog).map(|_| ())
        }
        Service::Whatsnew => {
            let channel = ensure_channel(query, catalog)?;
            if catalog
                .lang_files(&query.product, channel, WHATSNEW_SECTION)
                .is_none()
            {
                return Err(InvalidRequest::WhatsnewNotSupported {
                    product: query.product.clone(),
                    channel: channel.to_string(),
                });
            }
            Ok(())
        }
        Service::Translation => {
            let channel = ensure_channel(query, catalog)?;
            let locale = query.locale.as_deref().unwrap_or_default();
            if !catalog.is_supported_locale(&query.product, channel, locale) {
                return Err(InvalidRequest::UnsupportedLocale {
                    product: query.product.clone(),
                    channel: channel.to_string(),
                    locale: locale.to_string(),
                });
            }
            Ok(())
        }
    }
}

fn ensure_parameters(parameters: &PathParameters, required: usize) -> Result<(), InvalidRequest> {
    if parameters.len() < required {
        return Err(InvalidRequest::NotEnoughParameters {
            required,
            given: parameters.len(),
        });
    }
    Ok(())
}

fn ensure_channel<'q>(
    query: &'q StructuredQuery,
    catalog: &dyn Catalog,
) -> Result<&'q str, InvalidRequest> {
    let channel = query.channel.as_deref().unwrap_or_default();
    if !catalog.is_supported_channel(&query.product, channel) {
        return Err(InvalidRequest::UnsupportedChannel {
            product: query.product.clone(),
            channel: channel.to_string(),
        });
    }
    Ok(channel)
}
