//! Raw URL decoding: path segments, API version detection and query strings.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Version assumed when no supported versions are configured.
pub const DEFAULT_API_VERSION: &str = "v1";

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

/// Key/value pairs from the query string.
pub type QueryParameters = HashMap<String, String>;

/// Incoming request URL, split into path and optional query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub path: String,
    pub query: Option<String>,
}

impl ParsedUrl {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Split a request target such as `/api/v1/apple/storelocales?x=1`.
    pub fn parse(target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(path, Some(query.to_string())),
            None => Self::new(target, None),
        }
    }
}

/// Registry of API versions the deployment accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersions {
    /// Oldest first.
    supported: Vec<String>,
    current: String,
}

impl ApiVersions {
    pub fn new(supported: Vec<String>, current: String) -> Self {
        Self { supported, current }
    }

    pub fn is_supported(&self, version: &str) -> bool {
        self.supported.iter().any(|v| v == version)
    }

    /// Version applied to calls that don't name one (the oldest supported).
    pub fn default_version(&self) -> &str {
        self.supported
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self::new(
            vec![DEFAULT_API_VERSION.to_string()],
            DEFAULT_API_VERSION.to_string(),
        )
    }
}

/// Syntax check only: `v` followed by one or two ASCII digits.
pub fn is_valid_api_version(segment: &str) -> bool {
    VERSION_REGEX
        .get_or_init(|| Regex::new(r"^v[0-9]{1,2}$").unwrap())
        .is_match(segment)
}

/// Decoded path segments following the API marker and the optional version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParameters {
    segments: Vec<String>,
    version: Option<String>,
}

impl PathParameters {
    /// Segment at `index`, `None` when absent.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when anything followed the API marker, the version segment included.
    pub fn has_segments(&self) -> bool {
        !self.segments.is_empty() || self.version.is_some()
    }

    /// Version named in the path, if any.
    pub fn detected_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Unversioned calls predate API versioning.
    pub fn is_legacy(&self) -> bool {
        self.version.is_none()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Split a request path into its parameters.
///
/// Empty segments are dropped, the leading route marker (`api`) is
/// discarded and a following `vNN` segment is taken as the API version.
/// Remaining segments are URL-decoded and trimmed.
pub fn extract_path_parameters(path: &str) -> PathParameters {
    let mut segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .skip(1)
        .map(decode_segment)
        .peekable();

    let version = match segments.peek() {
        Some(first) if is_valid_api_version(first) => segments.next(),
        _ => None,
    };

    PathParameters {
        segments: segments.collect(),
        version,
    }
}

/// Split a raw query string into key/value pairs.
///
/// Tokens are separated by `&` and split at the first `=`; a bare `key`
/// maps to an empty string. When a key repeats, the first occurrence wins.
/// Keys and values are form-decoded, so `+` reads as a space.
pub fn extract_query_parameters(raw: &str) -> QueryParameters {
    let mut parameters = QueryParameters::new();

    for token in raw.split('&') {
        let (key, value) = token.split_once('=').unwrap_or((token, ""));
        if key.is_empty() {
            continue;
        }
        parameters
            .entry(decode_query_component(key))
            .or_insert_with(|| decode_query_component(value));
    }

    parameters
}

fn decode_query_component(raw: &str) -> String {
    decode_segment(&raw.replace('+', " "))
}

fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.trim().to_string(),
        // Not valid UTF-8 once decoded; keep it verbatim
        Err(_) => raw.trim().to_string(),
    }
}
