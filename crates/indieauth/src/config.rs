//! Configuration Types
//!
//! [`Options`] is the per-attempt store: who the user claims to be, how this
//! client is registered, which link relations to look for, and what discovery
//! found. [`ClientConfig`] holds transport settings that are shared across
//! attempts.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::discovery::DiscoveredEndpoints;
use crate::error::{IndieAuthError, Result};

/// Link relation advertising the authorization endpoint
pub const REL_AUTHORIZATION_ENDPOINT: &str = "authorization_endpoint";
/// Link relation advertising the token endpoint
pub const REL_TOKEN_ENDPOINT: &str = "token_endpoint";
/// Link relation advertising the Micropub endpoint
pub const REL_MICROPUB: &str = "micropub";

/// Default relation name to endpoint key mapping
pub fn default_rel_endpoints() -> HashMap<String, String> {
    HashMap::from([
        (REL_AUTHORIZATION_ENDPOINT.to_string(), "auth".to_string()),
        (REL_TOKEN_ENDPOINT.to_string(), "token".to_string()),
        (REL_MICROPUB.to_string(), "micropub".to_string()),
    ])
}

/// Caller-supplied relations are layered over the defaults
fn merge_rel_endpoints<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = HashMap::<String, String>::deserialize(deserializer)?;
    let mut merged = default_rel_endpoints();
    merged.extend(overrides);
    Ok(merged)
}

/// Writes the PKCE verifier in the clear
fn serialize_verifier<S>(
    verifier: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    verifier
        .as_ref()
        .map(|secret| secret.expose_secret())
        .serialize(serializer)
}

/// Options for a single authentication attempt
///
/// Deserializes from a camelCase configuration object:
///
/// ```rust
/// use indieauth::Options;
///
/// let options: Options = serde_json::from_value(serde_json::json!({
///     "me": "https://example.com",
///     "clientId": "https://app.example.org/",
///     "redirectUri": "https://app.example.org/callback",
///     "relEndpoints": { "microsub": "microsub" }
/// }))
/// .unwrap();
///
/// assert_eq!(options.rel_endpoints["microsub"], "microsub");
/// assert_eq!(options.rel_endpoints["authorization_endpoint"], "auth");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// The user's identity URL; replaced by the authoritative URL after discovery
    pub me: String,
    /// Client identifier (a URL)
    pub client_id: String,
    /// Where the provider sends the user back to
    pub redirect_uri: String,
    /// Requested scope; presence switches to the authorization-code flow
    pub scope: Option<String>,
    /// Opaque CSRF correlation value
    pub state: Option<String>,
    /// Relation name -> endpoint key
    #[serde(deserialize_with = "merge_rel_endpoints")]
    pub rel_endpoints: HashMap<String, String>,
    /// Endpoint key -> absolute URL, populated by discovery
    pub endpoints: HashMap<String, String>,
    /// Discovered authorization endpoint
    pub auth_endpoint: Option<String>,
    /// Discovered token endpoint
    pub token_endpoint: Option<String>,
    /// Discovered Micropub endpoint
    pub micropub_endpoint: Option<String>,
    /// Send a PKCE challenge with the authorization request
    pub pkce: bool,
    /// PKCE verifier for the pending authorization request
    ///
    /// Serialized as `codeVerifier` so it can be stored with the session
    /// between the redirect and the callback.
    #[serde(
        serialize_with = "serialize_verifier",
        skip_serializing_if = "Option::is_none"
    )]
    pub code_verifier: Option<SecretString>,
    /// Access token returned by a scoped verification
    #[serde(skip)]
    pub token: Option<SecretString>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            me: String::new(),
            client_id: String::new(),
            redirect_uri: String::new(),
            scope: None,
            state: None,
            rel_endpoints: default_rel_endpoints(),
            endpoints: HashMap::new(),
            auth_endpoint: None,
            token_endpoint: None,
            micropub_endpoint: None,
            pkce: false,
            code_verifier: None,
            token: None,
        }
    }
}

impl Options {
    /// Create options for an identity URL
    pub fn new(me: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            ..Self::default()
        }
    }

    /// Set the client identifier
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the redirect URI
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Request a scope (authorization-code flow)
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the state value
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Generate an unguessable state value
    pub fn with_random_state(mut self) -> Self {
        self.state = Some(uuid::Uuid::new_v4().simple().to_string());
        self
    }

    /// Map a link relation to an endpoint key, overriding any default
    pub fn with_rel_endpoint(mut self, rel: impl Into<String>, key: impl Into<String>) -> Self {
        self.rel_endpoints.insert(rel.into(), key.into());
        self
    }

    /// Enable or disable PKCE
    ///
    /// Building the authorization URL then stores a verifier in
    /// `code_verifier`; keep these options (or at least that field) until the
    /// code is verified.
    pub fn with_pkce(mut self, enabled: bool) -> Self {
        self.pkce = enabled;
        self
    }

    /// Whether a non-empty scope was requested
    pub fn is_scoped(&self) -> bool {
        self.scope.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Endpoint discovered for a link relation, under the current mapping
    pub fn endpoint_for_rel(&self, rel: &str) -> Option<&str> {
        let key = self.rel_endpoints.get(rel)?;
        self.endpoints.get(key).map(String::as_str)
    }

    /// Fail with `MissingOptions` listing every empty option in `requirements`
    ///
    /// Names use the camelCase configuration keys.
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::MissingOptions`] if any option is unset
    pub fn check_required(&self, requirements: &[&str]) -> Result<()> {
        let missing: Vec<&str> = requirements
            .iter()
            .copied()
            .filter(|name| !self.is_set(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(IndieAuthError::missing_options(missing))
        }
    }

    fn is_set(&self, name: &str) -> bool {
        let value = match name {
            "me" => Some(self.me.as_str()),
            "clientId" => Some(self.client_id.as_str()),
            "redirectUri" => Some(self.redirect_uri.as_str()),
            "scope" => self.scope.as_deref(),
            "state" => self.state.as_deref(),
            "authEndpoint" => self.auth_endpoint.as_deref(),
            "tokenEndpoint" => self.token_endpoint.as_deref(),
            "micropubEndpoint" => self.micropub_endpoint.as_deref(),
            _ => None,
        };
        value.is_some_and(|v| !v.is_empty())
    }

    /// Store a discovery result
    ///
    /// Replaces the endpoint mapping, refreshes the aliases and sets `me` to
    /// the authoritative URL.
    pub fn apply_discovery(&mut self, discovered: &DiscoveredEndpoints) {
        self.endpoints = discovered.endpoints.clone();
        self.auth_endpoint = self.endpoint_for_rel(REL_AUTHORIZATION_ENDPOINT).map(str::to_owned);
        self.token_endpoint = self.endpoint_for_rel(REL_TOKEN_ENDPOINT).map(str::to_owned);
        self.micropub_endpoint = self.endpoint_for_rel(REL_MICROPUB).map(str::to_owned);
        self.me = discovered.me.clone();
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("me", &self.me)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("state", &self.state)
            .field("rel_endpoints", &self.rel_endpoints)
            .field("endpoints", &self.endpoints)
            .field("pkce", &self.pkce)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout (default: 10 seconds)
    pub request_timeout: Duration,

    /// User agent for HTTP requests
    pub user_agent: String,

    /// Maximum permanent redirects followed while resolving an identity URL
    pub max_redirects: usize,

    /// Maximum response size in bytes (default: 1 MiB)
    pub max_response_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            user_agent: format!("indieauth/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            max_response_size: 1024 * 1024, // 1 MiB
        }
    }
}
