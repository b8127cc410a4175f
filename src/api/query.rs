//! Request classification: which service, and what it is asked about.

use crate::api::params::PathParameters;
use crate::catalog::Catalog;
use serde::Serialize;
use std::fmt;

/// Services the API can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Done,
    /// Deprecated name of [`Service::SupportedLocales`].
    FirefoxLocales,
    Listing,
    LocalesMapping,
    SupportedLocales,
    StoreLocales,
    Translation,
    Whatsnew,
}

impl Service {
    pub const ALL: [Service; 8] = [
        Service::Done,
        Service::FirefoxLocales,
        Service::Listing,
        Service::LocalesMapping,
        Service::SupportedLocales,
        Service::StoreLocales,
        Service::Translation,
        Service::Whatsnew,
    ];

    pub fn from_name(name: &str) -> Option<Service> {
        Self::ALL.into_iter().find(|service| service.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Service::Done => "done",
            Service::FirefoxLocales => "firefoxlocales",
            Service::Listing => "listing",
            Service::LocalesMapping => "localesmapping",
            Service::SupportedLocales => "supportedlocales",
            Service::StoreLocales => "storelocales",
            Service::Translation => "translation",
            Service::Whatsnew => "whatsnew",
        }
    }

    /// Minimum number of path parameters once the version is stripped.
    pub fn min_parameters(&self) -> usize {
        match self {
            Service::StoreLocales => 1,
            Service::LocalesMapping => 2,
            Service::FirefoxLocales
            | Service::SupportedLocales
            | Service::Done
            | Service::Listing
            | Service::Whatsnew => 3,
            Service::Translation => 4,
        }
    }

    /// Name of the service replacing a deprecated one.
    pub fn successor(&self) -> Option<Service> {
        match self {
            Service::FirefoxLocales => Some(Service::SupportedLocales),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the first path segment names a store or a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Store,
    Product,
}

impl QueryType {
    /// Only the store-scoped services take a store; anything else, unknown
    /// names included, is product-scoped.
    pub fn for_service(name: &str) -> QueryType {
        match name {
            "localesmapping" | "storelocales" => QueryType::Store,
            _ => QueryType::Product,
        }
    }
}

/// What a request asks for, as read from its path.
///
/// Built once per request; exactly one of `product` and `store` carries the
/// first segment depending on `query_type` (for product queries `store` holds
/// the product's home store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredQuery {
    pub service: String,
    pub query_type: QueryType,
    pub product: String,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl StructuredQuery {
    /// Read the query out of the path parameters. Never fails: missing
    /// segments leave their fields empty for the validator to reject.
    pub fn classify(params: &PathParameters, catalog: &dyn Catalog) -> Self {
        let service = params.get(1).unwrap_or_default().to_string();
        let query_type = QueryType::for_service(&service);

        let (product, store) = match (params.get(0), query_type) {
            (Some(store), QueryType::Store) => (String::new(), store.to_string()),
            (Some(id), QueryType::Product) => {
                let product = catalog.updated_product_code(id);
                let store = catalog.product_store(&product).unwrap_or_default();
                (product, store)
            }
            (None, _) => (String::new(), String::new()),
        };

        let locale = if service == Service::Translation.name() {
            params.get(3).map(str::to_string)
        } else {
            None
        };

        Self {
            channel: params.get(2).map(str::to_string),
            locale,
            service,
            query_type,
            product,
            store,
        }
    }
}
