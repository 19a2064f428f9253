//! HTTP Transport
//!
//! Discovery and verification never talk to the network directly. They hand a
//! [`FetchRequest`] to an [`HttpTransport`] and get an `http::Response` back,
//! which keeps the protocol logic testable with in-memory fakes.
//!
//! [`ReqwestTransport`] is the production implementation. It keeps two
//! `reqwest` clients: one with redirects disabled, used while resolving the
//! identity URL hop by hop, and one that follows redirects, used for the
//! single extra fetch after a temporary redirect.

use std::fmt;

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;

/// Response type returned by every transport
pub type HttpResponse = http::Response<Vec<u8>>;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client failed to send the request or read the response
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body exceeded the configured limit
    #[error("Response size limit exceeded ({limit} bytes)")]
    ResponseTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// The response could not be converted
    #[error("Invalid HTTP response: {0}")]
    InvalidResponse(String),

    /// Failure reported by a custom transport
    #[error("{0}")]
    Other(String),
}

/// How the transport treats 3xx responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Return redirect responses as-is
    Manual,
    /// Follow redirects up to the transport's own limit
    Follow,
}

/// Final URL of a response whose redirects were followed by the transport
///
/// Transports store it in the response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveUrl(pub Url);

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Optional request body
    pub body: Option<Vec<u8>>,
    /// Redirect handling
    pub redirect: RedirectMode,
}

impl FetchRequest {
    /// GET request that follows redirects
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
            redirect: RedirectMode::Follow,
        }
    }

    /// Form-encoded POST negotiating a JSON or form-encoded answer
    pub fn post_form(url: Url, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded;charset=UTF-8"),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, application/x-www-form-urlencoded"),
        );

        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body.into_bytes()),
            redirect: RedirectMode::Follow,
        }
    }

    /// Set the redirect mode
    pub fn redirect(mut self, mode: RedirectMode) -> Self {
        self.redirect = mode;
        self
    }
}

/// Injected HTTP capability
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Send a request and return the complete response
    ///
    /// Non-2xx statuses are NOT errors at this layer; only failures to obtain
    /// a response are.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained
    async fn send(&self, request: FetchRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    manual: reqwest::Client,
    follow: reqwest::Client,
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Create a transport from client configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let manual = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let follow = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            manual,
            follow,
            max_response_size: config.max_response_size,
        })
    }

    async fn execute(&self, request: FetchRequest) -> Result<HttpResponse, TransportError> {
        let client = match request.redirect {
            RedirectMode::Manual => &self.manual,
            RedirectMode::Follow => &self.follow,
        };

        let mut builder = client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut response = builder.send().await?;

        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_size as u64
        {
            return Err(TransportError::ResponseTooLarge {
                limit: self.max_response_size,
            });
        }

        let status = response.status();
        let headers = response.headers().clone();
        let effective_url = EffectiveUrl(response.url().clone());

        // Content-Length may be absent, so the limit is also enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_response_size {
                return Err(TransportError::ResponseTooLarge {
                    limit: self.max_response_size,
                });
            }
            body.extend_from_slice(&chunk);
        }

        let mut converted = http::Response::builder()
            .status(status)
            .body(body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        *converted.headers_mut() = headers;
        converted.extensions_mut().insert(effective_url);

        Ok(converted)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: FetchRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, redirect = ?request.redirect, "sending request");
        self.execute(request).await
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("inner", &"<reqwest::Client>")
            .field("max_response_size", &self.max_response_size)
            .finish()
    }
}
