//! # Endpoint Discovery
//!
//! Finds the endpoints that vouch for an identity URL, following
//! <https://indieauth.spec.indieweb.org/#discovery-by-clients>.
//!
//! ## Flow
//!
//! 1. Canonicalize the user-entered URL
//! 2. Resolve redirects: permanent redirects (301/308) move the identity,
//!    temporary ones (302/307) only move where the document is read from
//! 3. Collect hints from the `Link` response header
//! 4. Collect hints from `<link>`/`<a>` relations in the body; these override
//!    header hints for the same endpoint
//! 5. Fail unless at least one endpoint was found
//!
//! Which relations are looked for, and under which key each is reported, is
//! driven by the caller's `relation -> key` mapping. The defaults map
//! `authorization_endpoint`, `token_endpoint` and `micropub` to `auth`,
//! `token` and `micropub`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use indieauth::config::{default_rel_endpoints, ClientConfig};
//! use indieauth::discovery::EndpointDiscovery;
//! use indieauth::scraper::HtmlRelScraper;
//! use indieauth::transport::ReqwestTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let transport = Arc::new(ReqwestTransport::new(&config)?);
//! let discovery = EndpointDiscovery::new(transport, Arc::new(HtmlRelScraper), config);
//!
//! let found = discovery
//!     .discover("https://martymcgui.re/", &default_rel_endpoints())
//!     .await?;
//! println!("{} -> {:?}", found.me, found.get("auth"));
//! # Ok(())
//! # }
//! ```

mod fetcher;
mod link_header;
mod redirect;
mod types;

pub use fetcher::EndpointDiscovery;
pub use link_header::{endpoints_from_headers, parse_link_header};
pub use redirect::{RedirectKind, resolve_redirects};
pub use types::{DiscoveredEndpoints, ResolvedLocation};
