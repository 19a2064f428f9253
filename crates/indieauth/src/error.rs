//! Error Types
//!
//! Every failure in the discovery and verification flow is reported as an
//! [`IndieAuthError`]. Errors that originate from an HTTP response carry the
//! response status, so callers can branch on [`IndieAuthError::status`]
//! (HTTP-level) versus its absence (protocol or logic level).
//!
//! For hosts that forward failures to a browser or a log pipeline,
//! [`IndieAuthError::to_record`] flattens an error into a serializable
//! [`ErrorRecord`] of `{message, status, cause}`.

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, IndieAuthError>;

/// IndieAuth client errors
#[derive(Debug, Error)]
pub enum IndieAuthError {
    /// Input could not be parsed as a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// One or more required options are not set
    #[error("Missing required options: {}", .missing.join(", "))]
    MissingOptions {
        /// Option names that were empty or unset
        missing: Vec<String>,
    },

    /// The default HTTP transport could not be constructed
    #[error("Failed to initialize HTTP transport")]
    TransportInit(#[source] TransportError),

    /// The transport failed before a response was received
    #[error("Error fetching {url}")]
    Network {
        /// URL being fetched
        url: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// A fetch returned an unusable HTTP status
    #[error("Error getting page {url}: HTTP {status}")]
    FetchFailed {
        /// HTTP status code
        status: u16,
        /// URL that produced the status
        url: String,
    },

    /// Permanent redirects exceeded the configured hop limit
    #[error("Too many redirects (limit {limit}) while resolving {url}")]
    TooManyRedirects {
        /// Configured hop limit
        limit: usize,
        /// URL where resolution started
        url: String,
    },

    /// No endpoint relations were found for the identity URL
    #[error("Error getting authorization endpoints for {url}")]
    DiscoveryFailed {
        /// Authoritative URL that was searched
        url: String,
    },

    /// Discovery failed while building the authorization URL
    #[error("Error getting auth url")]
    AuthUrlFailed(#[source] Box<IndieAuthError>),

    /// The authorization or token endpoint rejected the code
    #[error("Error verifying authorization code: HTTP {status}")]
    VerificationFailed {
        /// HTTP status code
        status: u16,
    },

    /// The provider answered with an OAuth error
    #[error("{0}")]
    ProviderError(String),

    /// The provider response could not be understood
    #[error("The endpoint did not return the expected parameters: {0}")]
    MalformedResponse(String),

    /// The provider vouched for a different identity
    #[error("The me values did not match: expected {expected}, got {actual}")]
    IdentityMismatch {
        /// Identity stored in the options
        expected: String,
        /// Identity returned by the provider
        actual: String,
    },

    /// The callback state does not correlate with this attempt
    #[error("The state value did not match")]
    StateMismatch,
}

impl IndieAuthError {
    /// Build a `MissingOptions` error from option names
    pub fn missing_options<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingOptions {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// HTTP status associated with this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status, .. } | Self::VerificationFailed { status } => Some(*status),
            Self::AuthUrlFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Flatten into the structured `{message, status, cause}` record
    pub fn to_record(&self) -> ErrorRecord {
        let cause = std::error::Error::source(self).map(ToString::to_string);
        ErrorRecord {
            message: self.to_string(),
            status: self.status(),
            cause,
        }
    }
}

/// Serializable view of an [`IndieAuthError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// Human readable message
    pub message: String,
    /// HTTP status, absent for protocol or logic failures
    pub status: Option<u16>,
    /// Message of the underlying cause, if any
    pub cause: Option<String>,
}
