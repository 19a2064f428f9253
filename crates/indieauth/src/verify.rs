//! Authorization code verification
//!
//! After the provider redirects back with a `code`, the code is posted to the
//! authorization endpoint (identity flow) or exchanged at the token endpoint
//! (scoped flow). Either way the answer must name the same `me` this attempt
//! started with.

use std::collections::HashMap;

use http::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Options;
use crate::error::{IndieAuthError, Result};
use crate::query::{decode_query, encode_query};
use crate::transport::{FetchRequest, HttpTransport};

/// Parsed authorization or token endpoint answer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    /// Identity the provider vouches for
    pub me: Option<String>,
    /// Access token (scoped flow)
    pub access_token: Option<String>,
    /// Token type, usually `Bearer`
    pub token_type: Option<String>,
    /// Granted scope
    pub scope: Option<String>,
    /// OAuth error code
    pub error: Option<String>,
    /// Human readable error
    pub error_description: Option<String>,
    /// Everything else the provider sent
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ProviderResponse {
    /// Parse a response body according to its content type
    ///
    /// `application/json` bodies are parsed as JSON, anything else as a
    /// form-encoded string.
    ///
    /// # Errors
    ///
    /// Returns [`IndieAuthError::MalformedResponse`] if the body does not fit
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self> {
        let is_json = content_type.is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("application/json")
        });

        if is_json {
            return serde_json::from_slice(body)
                .map_err(|e| IndieAuthError::MalformedResponse(format!("invalid JSON: {e}")));
        }

        let text = String::from_utf8_lossy(body);
        let fields = decode_query(&text);
        serde_json::to_value(fields)
            .and_then(serde_json::from_value)
            .map_err(|e| IndieAuthError::MalformedResponse(e.to_string()))
    }

    /// The provider's error message, preferring the description
    pub fn error_message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.error.as_deref().filter(|e| !e.is_empty()))
    }
}

/// A successfully verified identity
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// The verified identity URL
    pub me: String,
    /// Access token (scoped flow)
    pub access_token: Option<SecretString>,
    /// Token type
    pub token_type: Option<String>,
    /// Granted scope
    pub scope: Option<String>,
}

/// Compare identity URLs, ignoring trailing slashes
pub fn same_identity(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Options the verification of the current flow needs
pub fn verification_requirements(options: &Options) -> [&'static str; 4] {
    let endpoint = if options.is_scoped() {
        "tokenEndpoint"
    } else {
        "authEndpoint"
    };
    ["me", "clientId", "redirectUri", endpoint]
}

/// Check the `state` returned on the callback
///
/// # Errors
///
/// Returns [`IndieAuthError::StateMismatch`] unless it equals the stored state
pub fn verify_state(options: &Options, returned: &str) -> Result<()> {
    match options.state.as_deref() {
        Some(expected) if expected == returned => Ok(()),
        _ => Err(IndieAuthError::StateMismatch),
    }
}

/// Verify an authorization code
///
/// On success a returned access token is stored in `options.token` and the
/// PKCE verifier, if any, is consumed.
///
/// # Errors
///
/// - [`IndieAuthError::MissingOptions`] for unset requirements
/// - [`IndieAuthError::Network`] if the request could not be made
/// - [`IndieAuthError::VerificationFailed`] on a non-2xx answer
/// - [`IndieAuthError::ProviderError`] if the provider reported an error
/// - [`IndieAuthError::MalformedResponse`] if `me` is absent
/// - [`IndieAuthError::IdentityMismatch`] if `me` names someone else
pub async fn verify_code(
    transport: &dyn HttpTransport,
    options: &mut Options,
    code: &str,
) -> Result<VerifiedIdentity> {
    options.check_required(&verification_requirements(options))?;

    let scoped = options.is_scoped();
    let endpoint = if scoped {
        options.token_endpoint.as_deref()
    } else {
        options.auth_endpoint.as_deref()
    }
    .unwrap_or_default();
    let endpoint = Url::parse(endpoint)
        .map_err(|e| IndieAuthError::InvalidUrl(format!("{endpoint}: {e}")))?;

    let mut form = vec![
        ("code", code),
        ("client_id", options.client_id.as_str()),
        ("redirect_uri", options.redirect_uri.as_str()),
    ];
    if scoped {
        form.push(("grant_type", "authorization_code"));
    }
    if let Some(verifier) = options.code_verifier.as_ref() {
        form.push(("code_verifier", verifier.expose_secret().as_str()));
    }
    let body = encode_query(form);

    debug!(endpoint = %endpoint, scoped, "verifying authorization code");
    let url = endpoint.to_string();
    let response = transport
        .send(FetchRequest::post_form(endpoint, body))
        .await
        .map_err(|source| IndieAuthError::Network { url, source })?;

    if !response.status().is_success() {
        warn!(status = response.status().as_u16(), "authorization code rejected");
        return Err(IndieAuthError::VerificationFailed {
            status: response.status().as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let parsed = ProviderResponse::parse(content_type, response.body())?;

    if let Some(message) = parsed.error_message() {
        warn!(error = message, "provider returned an error");
        return Err(IndieAuthError::ProviderError(message.to_string()));
    }

    let Some(returned_me) = parsed.me.as_deref().filter(|me| !me.is_empty()) else {
        return Err(IndieAuthError::MalformedResponse(
            "response has no me value".to_string(),
        ));
    };

    if !same_identity(returned_me, &options.me) {
        warn!(expected = %options.me, actual = returned_me, "identity mismatch");
        return Err(IndieAuthError::IdentityMismatch {
            expected: options.me.clone(),
            actual: returned_me.to_string(),
        });
    }

    let access_token = parsed.access_token.clone().map(SecretString::new);
    options.token = access_token.clone();
    options.code_verifier = None;

    debug!(me = %options.me, has_token = access_token.is_some(), "identity verified");
    Ok(VerifiedIdentity {
        me: options.me.clone(),
        access_token,
        token_type: parsed.token_type,
        scope: parsed.scope,
    })
}
