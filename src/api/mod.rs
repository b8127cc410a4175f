//! API request decoding, classification and validation.
//!
//! # Architecture
//!
//! - `params`: path segments, API version detection and query strings
//! - `query`: service names and the structured query read from the path
//! - `request`: the validation pipeline deciding whether a call can run
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::api::{ApiRequest, ApiVersions, ParsedUrl};
//!
//! let versions = ApiVersions::default();
//! let request = ApiRequest::new(&ParsedUrl::parse("/api/v1/apple/storelocales"), &catalog, &versions);
//! if let Some(service) = request.get_service() {
//!     // dispatch
//! }
//! ```

mod params;
mod query;
mod request;

pub use params::{
    extract_path_parameters, extract_query_parameters, is_valid_api_version, ApiVersions,
    ParsedUrl, PathParameters, QueryParameters, DEFAULT_API_VERSION,
};
pub use query::{QueryType, Service, StructuredQuery};
pub use request::{ApiError, ApiRequest, InvalidRequest, WHATSNEW_SECTION};
