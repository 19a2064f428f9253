//! Authorization URL building
//!
//! Two request shapes are produced, depending on whether a scope was
//! requested:
//!
//! - no scope: `response_type=id`, the provider only proves identity and
//!   the returned code is verified at the authorization endpoint
//! - scope: `scope=...&response_type=code`, the returned code is exchanged
//!   at the token endpoint for an access token

use secrecy::SecretString;
use tracing::debug;

use crate::config::Options;
use crate::error::Result;
use crate::pkce;
use crate::query::{append_query, encode_query};

/// Options every authorization request needs
pub const AUTH_URL_REQUIREMENTS: [&str; 4] = ["me", "clientId", "redirectUri", "authEndpoint"];

/// Build the URL that starts the flow at the discovered authorization endpoint
///
/// Does not run discovery. With PKCE enabled, a fresh verifier is stored in
/// `options.code_verifier`.
///
/// # Errors
///
/// Returns [`crate::IndieAuthError::MissingOptions`] if any of
/// [`AUTH_URL_REQUIREMENTS`] is unset
pub fn build_auth_url(options: &mut Options) -> Result<String> {
    options.check_required(&AUTH_URL_REQUIREMENTS)?;

    let mut params: Vec<(&str, String)> = vec![
        ("me", options.me.clone()),
        ("client_id", options.client_id.clone()),
        ("redirect_uri", options.redirect_uri.clone()),
    ];
    if let Some(state) = options.state.as_deref() {
        params.push(("state", state.to_string()));
    }

    match options.scope.as_deref() {
        Some(scope) if options.is_scoped() => {
            params.push(("scope", scope.to_string()));
            params.push(("response_type", "code".to_string()));
        }
        _ => params.push(("response_type", "id".to_string())),
    }

    if options.pkce {
        let verifier = pkce::generate_code_verifier();
        params.push(("code_challenge", pkce::code_challenge(&verifier)));
        params.push(("code_challenge_method", pkce::CHALLENGE_METHOD.to_string()));
        options.code_verifier = Some(SecretString::new(verifier));
    }

    let query = encode_query(params.iter().map(|(k, v)| (*k, v.as_str())));
    let endpoint = options.auth_endpoint.as_deref().unwrap_or_default();

    debug!(endpoint, scoped = options.is_scoped(), pkce = options.pkce, "built authorization url");
    Ok(append_query(endpoint, &query))
}
