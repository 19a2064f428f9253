//! IndieAuth client session
//!
//! [`IndieAuthentication`] owns the [`Options`] of one authentication attempt
//! together with the capabilities it needs (transport and relation scraper),
//! and exposes the whole flow as methods:
//!
//! ```rust,no_run
//! use indieauth::{IndieAuthentication, Options};
//!
//! # async fn example() -> indieauth::Result<()> {
//! let options = Options::new("https://martymcgui.re/")
//!     .with_client_id("https://app.example.org/")
//!     .with_redirect_uri("https://app.example.org/callback")
//!     .with_random_state();
//! let mut auth = IndieAuthentication::new(options)?;
//!
//! // Send the user here...
//! let url = auth.get_auth_url().await?;
//!
//! // ...and once they come back with `code` and `state`:
//! # let (code, state) = ("", "");
//! auth.verify_state(state)?;
//! let me = auth.verify_code(code).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::authorize::build_auth_url;
use crate::canonical::canonicalize;
use crate::config::{ClientConfig, Options};
use crate::discovery::{DiscoveredEndpoints, EndpointDiscovery, ResolvedLocation};
use crate::error::{IndieAuthError, Result};
use crate::scraper::{HtmlRelScraper, RelScraper};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::verify::{self, VerifiedIdentity};

/// One IndieAuth authentication attempt
#[derive(Debug, Clone)]
pub struct IndieAuthentication {
    options: Options,
    discovery: EndpointDiscovery,
}

impl IndieAuthentication {
    /// Create a session over the default `reqwest` transport and HTML scraper
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::TransportInit`] if the HTTP client cannot be built
    pub fn new(options: Options) -> Result<Self> {
        Self::with_config(options, ClientConfig::default())
    }

    /// Create a session over the default capabilities with custom settings
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::TransportInit`] if the HTTP client cannot be built
    pub fn with_config(options: Options, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config).map_err(IndieAuthError::TransportInit)?;
        Ok(Self::with_capabilities_and_config(
            options,
            Arc::new(transport),
            Arc::new(HtmlRelScraper::new()),
            config,
        ))
    }

    /// Create a session over caller-provided capabilities
    pub fn with_capabilities(
        options: Options,
        transport: Arc<dyn HttpTransport>,
        scraper: Arc<dyn RelScraper>,
    ) -> Self {
        Self::with_capabilities_and_config(options, transport, scraper, ClientConfig::default())
    }

    /// Create a session over caller-provided capabilities and settings
    pub fn with_capabilities_and_config(
        options: Options,
        transport: Arc<dyn HttpTransport>,
        scraper: Arc<dyn RelScraper>,
        config: ClientConfig,
    ) -> Self {
        Self {
            options,
            discovery: EndpointDiscovery::new(transport, scraper, config),
        }
    }

    /// Current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable access to the options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Consume the session, returning its options
    pub fn into_options(self) -> Options {
        self.options
    }

    /// Canonical string form of a user-entered URL
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::InvalidUrl`] if `url` cannot be parsed
    pub fn get_canonical_url(&self, url: &str) -> Result<String> {
        canonicalize(url)
    }

    /// Canonicalize `url` and resolve its redirect chain
    ///
    /// # Errors
    ///
    /// Any canonicalization or redirect resolution error
    pub async fn get_url_with_redirects(&self, url: &str) -> Result<ResolvedLocation> {
        self.discovery.resolve(url).await
    }

    /// Discover endpoints for `url` and store them in the options
    ///
    /// Uses the options' relation mapping. On success `me` becomes the
    /// authoritative URL.
    ///
    /// # Errors
    ///
    /// Any discovery error; the options are left untouched on failure
    pub async fn get_endpoints_from_url(&mut self, url: &str) -> Result<DiscoveredEndpoints> {
        let discovered = self
            .discovery
            .discover(url, &self.options.rel_endpoints)
            .await?;
        self.options.apply_discovery(&discovered);
        Ok(discovered)
    }

    /// Discover endpoints for `me` and build the authorization URL
    ///
    /// Discovery always runs, so `me` in the URL is the authoritative identity.
    ///
    /// # Errors
    ///
    /// - [`IndieAuthError::MissingOptions`] if `me` is unset, or if client
    ///   registration or the authorization endpoint is missing after discovery
    /// - [`IndieAuthError::AuthUrlFailed`] wrapping any discovery error
    pub async fn get_auth_url(&mut self) -> Result<String> {
        self.options.check_required(&["me"])?;

        let me = self.options.me.clone();
        self.get_endpoints_from_url(&me)
            .await
            .map_err(|e| IndieAuthError::AuthUrlFailed(Box::new(e)))?;

        debug!(me = %self.options.me, "building authorization url");
        build_auth_url(&mut self.options)
    }

    /// Verify an authorization code, returning the verified identity URL
    ///
    /// # Errors
    ///
    /// See [`verify_code_response`](Self::verify_code_response)
    pub async fn verify_code(&mut self, code: &str) -> Result<String> {
        self.verify_code_response(code).await.map(|verified| verified.me)
    }

    /// Verify an authorization code, returning everything the provider granted
    ///
    /// A returned access token is also stored in the options.
    ///
    /// # Errors
    ///
    /// - [`IndieAuthError::MissingOptions`] if a required option is unset
    /// - [`IndieAuthError::Network`] if the endpoint could not be reached
    /// - [`IndieAuthError::VerificationFailed`] on a non-2xx answer
    /// - [`IndieAuthError::ProviderError`] if the provider reported an error
    /// - [`IndieAuthError::MalformedResponse`] if the answer has no `me`
    /// - [`IndieAuthError::IdentityMismatch`] if it names another identity
    pub async fn verify_code_response(&mut self, code: &str) -> Result<VerifiedIdentity> {
        verify::verify_code(
            self.discovery.transport().as_ref(),
            &mut self.options,
            code,
        )
        .await
    }

    /// Check the `state` returned on the callback
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::StateMismatch`] unless it matches
    pub fn verify_state(&self, returned: &str) -> Result<()> {
        verify::verify_state(&self.options, returned)
    }
}
