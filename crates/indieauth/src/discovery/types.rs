//! # Discovery Types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::HttpResponse;

/// Outcome of redirect resolution
#[derive(Debug)]
pub struct ResolvedLocation {
    /// Authoritative URL: reached through permanent redirects only
    pub url: Url,

    /// Where the response was actually fetched from
    ///
    /// Equal to `url` unless a temporary redirect was followed.
    pub fetched_url: Url,

    /// Successful response
    pub response: HttpResponse,
}

impl ResolvedLocation {
    /// Whether a temporary redirect moved the fetch away from the authoritative URL
    pub fn is_detour(&self) -> bool {
        self.url != self.fetched_url
    }
}

/// Endpoints discovered for an identity URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredEndpoints {
    /// Authoritative identity URL
    pub me: String,

    /// Endpoint key -> absolute URL
    pub endpoints: HashMap<String, String>,
}

impl DiscoveredEndpoints {
    /// Look up an endpoint by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.endpoints.get(key).map(String::as_str)
    }
}
