//! # IndieAuth - Client for Web Sign-In with Your Own URL
//!
//! A client for the [IndieAuth](https://indieauth.spec.indieweb.org/) handshake:
//! a user signs in with their own URL, and the endpoints advertised by that URL
//! vouch for them.
//!
//! ## Key Features
//!
//! - **Endpoint Discovery** - `Link` header and HTML `<link>`/`<a>` relations,
//!   body taking precedence over headers
//! - **Redirect Semantics** - permanent redirects (301/308) move the identity,
//!   temporary ones (302/307) never do
//! - **Configurable Relations** - map any link relation (e.g. `microsub`) to an
//!   endpoint key
//! - **Identity and Scoped Flows** - `response_type=id` or
//!   `scope=...&response_type=code`
//! - **Code Verification** - JSON or form-encoded provider answers, with an
//!   identity-match check
//! - **PKCE** - optional RFC 7636 S256 challenge
//! - **Injectable Capabilities** - HTTP transport and relation scraper are
//!   traits, so the protocol logic runs against fakes in tests
//!
//! ## Architecture
//!
//! - [`client`] - [`IndieAuthentication`], the per-attempt session
//! - [`config`] - [`Options`] and transport [`ClientConfig`]
//! - [`canonical`] - URL canonicalization
//! - [`discovery`] - redirect resolution and endpoint discovery
//! - [`authorize`] - authorization URL building
//! - [`verify`] - authorization code verification
//! - [`transport`] - the [`HttpTransport`] seam and its `reqwest` implementation
//! - [`scraper`] - the [`RelScraper`] seam and its HTML implementation
//! - [`pkce`], [`query`] - helpers
//! - [`error`] - [`IndieAuthError`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use indieauth::{IndieAuthentication, Options};
//!
//! # async fn example() -> indieauth::Result<()> {
//! let options = Options::new("http://mmg.re")
//!     .with_client_id("https://example.com/")
//!     .with_redirect_uri("https://example.com/indieauth-redirect");
//!
//! let mut auth = IndieAuthentication::new(options)?;
//! let url = auth.get_auth_url().await?;
//! // https://indieauth.com/auth?me=https%3A%2F%2Fmartymcgui.re%2F&client_id=...&response_type=id
//! println!("{url}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Standards Compliance
//!
//! - **IndieAuth** - Discovery by clients, authentication and authorization
//! - **RFC 8288** - Web Linking (`Link` header)
//! - **RFC 9110** - HTTP Semantics (redirect status codes, relative `Location`)
//! - **RFC 7636** - Proof Key for Code Exchange (PKCE)

pub mod authorize;
pub mod canonical;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pkce;
pub mod query;
pub mod scraper;
pub mod transport;
pub mod verify;

#[cfg(test)]
mod testing;

#[doc(inline)]
pub use client::IndieAuthentication;

#[doc(inline)]
pub use config::{ClientConfig, Options, default_rel_endpoints};

#[doc(inline)]
pub use discovery::{DiscoveredEndpoints, ResolvedLocation};

#[doc(inline)]
pub use error::{ErrorRecord, IndieAuthError, Result};

#[doc(inline)]
pub use scraper::{HtmlRelScraper, RelMap, RelScraper};

#[doc(inline)]
pub use transport::{
    FetchRequest, HttpResponse, HttpTransport, RedirectMode, ReqwestTransport, TransportError,
};

#[doc(inline)]
pub use verify::{ProviderResponse, VerifiedIdentity};
