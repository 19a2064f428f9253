//! URL canonicalization
//!
//! <https://indieauth.spec.indieweb.org/#url-canonicalization>

use url::{ParseError, Url};

use crate::error::{IndieAuthError, Result};

/// Parse a user-entered URL into its canonical form
///
/// Scheme and host are lower-cased and a bare authority gains a `/` path.
/// Input without a scheme (`example.com`) is treated as `http://`.
///
/// # Errors
///
/// Returns [`IndieAuthError::InvalidUrl`] if the input is not a URL
pub fn canonical_url(input: &str) -> Result<Url> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) if !input.is_empty() && !input.contains("://") => {
            Url::parse(&format!("http://{input}"))
                .map_err(|e| IndieAuthError::InvalidUrl(format!("{input}: {e}")))
        }
        Err(e) => Err(IndieAuthError::InvalidUrl(format!("{input}: {e}"))),
    }
}

/// String form of [`canonical_url`]
///
/// # Errors
///
/// Returns [`IndieAuthError::InvalidUrl`] if the input is not a URL
pub fn canonicalize(input: &str) -> Result<String> {
    canonical_url(input).map(String::from)
}
