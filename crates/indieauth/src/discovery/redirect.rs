//! # Redirect Resolution
//!
//! Follows an identity URL to the document that describes it, tracking which
//! URL is authoritative:
//!
//! - **301 / 308** (permanent): the target replaces the identity URL and is
//!   resolved again
//! - **302 / 307** (temporary): the target is fetched once (following any
//!   further redirects) but the identity URL stays put
//!
//! <https://indieauth.spec.indieweb.org/#redirect-examples>

use http::StatusCode;
use http::header::LOCATION;
use tracing::{debug, warn};
use url::Url;

use super::types::ResolvedLocation;
use crate::error::{IndieAuthError, Result};
use crate::transport::{EffectiveUrl, FetchRequest, HttpResponse, HttpTransport, RedirectMode};

/// How a response status moves the authoritative URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// 2xx
    Success,
    /// 301 or 308
    Permanent,
    /// 302 or 307
    Temporary,
    /// Anything else
    Unusable,
}

impl RedirectKind {
    /// Classify a response status
    pub fn classify(status: StatusCode) -> Self {
        match status {
            s if s.is_success() => Self::Success,
            StatusCode::MOVED_PERMANENTLY | StatusCode::PERMANENT_REDIRECT => Self::Permanent,
            StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT => Self::Temporary,
            _ => Self::Unusable,
        }
    }
}

/// Resolve `url` to its authoritative form and a successful response
///
/// At most `max_redirects` permanent redirects are followed.
///
/// # Errors
///
/// - [`IndieAuthError::Network`] if the transport fails
/// - [`IndieAuthError::FetchFailed`] on an unusable status, a redirect
///   without `Location`, or a failed fetch after a temporary redirect
/// - [`IndieAuthError::TooManyRedirects`] past the hop limit
pub async fn resolve_redirects(
    transport: &dyn HttpTransport,
    url: Url,
    max_redirects: usize,
) -> Result<ResolvedLocation> {
    let start = url.to_string();
    let mut current = url;
    let mut hops = 0;

    loop {
        let response = fetch(
            transport,
            FetchRequest::get(current.clone()).redirect(RedirectMode::Manual),
        )
        .await?;
        let status = response.status();

        match RedirectKind::classify(status) {
            RedirectKind::Success => {
                debug!(url = %current, hops, "resolved authoritative url");
                return Ok(ResolvedLocation {
                    url: current.clone(),
                    fetched_url: current,
                    response,
                });
            }
            RedirectKind::Permanent => {
                if hops >= max_redirects {
                    warn!(url = %start, limit = max_redirects, "permanent redirect limit exceeded");
                    return Err(IndieAuthError::TooManyRedirects {
                        limit: max_redirects,
                        url: start,
                    });
                }
                hops += 1;

                let next = location(&response, &current)?;
                debug!(from = %current, to = %next, status = status.as_u16(), "permanent redirect");
                current = next;
            }
            RedirectKind::Temporary => {
                let follow = location(&response, &current)?;
                debug!(from = %current, to = %follow, status = status.as_u16(), "temporary redirect");

                let secondary = fetch(transport, FetchRequest::get(follow.clone())).await?;
                if !secondary.status().is_success() {
                    return Err(IndieAuthError::FetchFailed {
                        status: secondary.status().as_u16(),
                        url: follow.to_string(),
                    });
                }

                let fetched_url = secondary
                    .extensions()
                    .get::<EffectiveUrl>()
                    .map_or(follow, |effective| effective.0.clone());

                return Ok(ResolvedLocation {
                    url: current,
                    fetched_url,
                    response: secondary,
                });
            }
            RedirectKind::Unusable => {
                return Err(IndieAuthError::FetchFailed {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }
        }
    }
}

async fn fetch(transport: &dyn HttpTransport, request: FetchRequest) -> Result<HttpResponse> {
    let url = request.url.to_string();
    transport
        .send(request)
        .await
        .map_err(|source| IndieAuthError::Network { url, source })
}

/// `Location` of a redirect, resolved against the URL that produced it
fn location(response: &HttpResponse, current: &Url) -> Result<Url> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| current.join(value.trim()).ok())
        .ok_or_else(|| IndieAuthError::FetchFailed {
            status: response.status().as_u16(),
            url: current.to_string(),
        })
}
