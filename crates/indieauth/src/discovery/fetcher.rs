//! # Endpoint Discovery
//!
//! Fetches an identity URL and merges endpoint hints from the `Link` header
//! and from the document's `<link>`/`<a>` relations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::link_header::{endpoints_from_headers, relation_keys};
use super::redirect::resolve_redirects;
use super::types::{DiscoveredEndpoints, ResolvedLocation};
use crate::canonical::canonical_url;
use crate::config::ClientConfig;
use crate::error::{IndieAuthError, Result};
use crate::scraper::RelScraper;
use crate::transport::HttpTransport;

/// Endpoint discovery over injected transport and scraper
///
/// Holds no per-attempt state and can be shared between attempts.
#[derive(Debug, Clone)]
pub struct EndpointDiscovery {
    transport: Arc<dyn HttpTransport>,
    scraper: Arc<dyn RelScraper>,
    config: ClientConfig,
}

impl EndpointDiscovery {
    /// Create a discovery engine
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        scraper: Arc<dyn RelScraper>,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            scraper,
            config,
        }
    }

    /// Transport used for every request
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Canonicalize `url` and resolve its redirects
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::InvalidUrl`] or any redirect resolution error
    pub async fn resolve(&self, url: &str) -> Result<ResolvedLocation> {
        let url = canonical_url(url)?;
        resolve_redirects(self.transport.as_ref(), url, self.config.max_redirects).await
    }

    /// Discover endpoints for an identity URL
    ///
    /// Body relations take precedence over `Link` header relations for the
    /// same key. Relative hints resolve against the document's location.
    ///
    /// # Errors
    ///
    /// - [`IndieAuthError::InvalidUrl`] if `url` cannot be parsed
    /// - any [`resolve`](Self::resolve) error
    /// - [`IndieAuthError::DiscoveryFailed`] if no relation in
    ///   `rel_endpoints` was found
    pub async fn discover(
        &self,
        url: &str,
        rel_endpoints: &HashMap<String, String>,
    ) -> Result<DiscoveredEndpoints> {
        let resolved = self.resolve(url).await?;
        if resolved.is_detour() {
            debug!(
                me = %resolved.url,
                fetched = %resolved.fetched_url,
                "discovering through temporary redirect"
            );
        }

        let base = &resolved.fetched_url;
        let mut endpoints = endpoints_from_headers(resolved.response.headers(), rel_endpoints, base);
        if !endpoints.is_empty() {
            debug!(count = endpoints.len(), "endpoints advertised in Link header");
        }

        let html = String::from_utf8_lossy(resolved.response.body());
        let rels = self.scraper.scrape(&html, base);
        for (relation, key) in relation_keys(rel_endpoints) {
            if let Some(first) = rels.get(&relation).and_then(|urls| urls.first()) {
                endpoints.insert(key.to_string(), first.clone());
            }
        }

        if endpoints.is_empty() {
            warn!(url = %resolved.url, "no endpoints discovered");
            return Err(IndieAuthError::DiscoveryFailed {
                url: resolved.url.to_string(),
            });
        }

        debug!(me = %resolved.url, ?endpoints, "discovered endpoints");
        Ok(DiscoveredEndpoints {
            me: resolved.url.to_string(),
            endpoints,
        })
    }
}
