//! Common test utilities for integration tests
//!
//! Provides a wiremock-backed identity site and provider, so discovery and
//! verification run over real HTTP against local fixtures.

#![allow(dead_code)]

use indieauth::{IndieAuthentication, Options};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const CLIENT_ID: &str = "https://example.com/";
pub const REDIRECT_URI: &str = "https://example.com/indieauth-redirect";

/// Mock identity site and IndieAuth provider on one server
pub struct MockIdentityServer {
    pub server: MockServer,
    pub base_url: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub micropub_endpoint: String,
}

impl MockIdentityServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}/", server.uri());

        Self {
            auth_endpoint: format!("{base_url}auth"),
            token_endpoint: format!("{base_url}token"),
            micropub_endpoint: format!("{base_url}micropub"),
            base_url,
            server,
        }
    }

    /// Absolute URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Profile page advertising this server's endpoints through `<link>` tags
    pub fn profile_html(&self) -> String {
        format!(
            r#"<!doctype html>
<html>
  <head>
    <title>Profile</title>
    <link rel="authorization_endpoint" href="{}">
    <link rel="token_endpoint" href="{}">
    <link rel="micropub" href="/micropub">
    <link rel="microsub" href="https://aperture.maktro.net/microsub/1">
  </head>
  <body><a rel="me" href="https://github.com/example">GitHub</a></body>
</html>"#,
            self.auth_endpoint, self.token_endpoint
        )
    }

    /// Serve an HTML page at `page_path`
    pub async fn mock_page(&self, page_path: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
            .mount(&self.server)
            .await;
    }

    /// Serve an HTML page with a `Link` header at `page_path`
    pub async fn mock_page_with_link(&self, page_path: &str, link: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", link)
                    .set_body_raw(html.to_string(), "text/html"),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve this server's profile at `page_path`
    pub async fn mock_profile(&self, page_path: &str) {
        self.mock_page(page_path, &self.profile_html()).await;
    }

    /// Redirect `from_path` to `location`
    pub async fn mock_redirect(&self, from_path: &str, status: u16, location: &str) {
        Mock::given(method("GET"))
            .and(path(from_path))
            .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
            .mount(&self.server)
            .await;
    }

    /// Answer GETs on `page_path` with a bare status
    pub async fn mock_status(&self, page_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Authorization endpoint confirming `me`, form-encoded
    pub async fn mock_auth_verify_form(&self, me: &str) {
        let body = format!("me={}", urlencode(me));
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "application/x-www-form-urlencoded"),
            )
            .mount(&self.server)
            .await;
    }

    /// Authorization endpoint confirming `me`, as JSON
    pub async fn mock_auth_verify_json(&self, me: &str) {
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "me": me })))
            .mount(&self.server)
            .await;
    }

    /// Token endpoint issuing `access_token` for `me`
    pub async fn mock_token_success(&self, me: &str, access_token: &str, scope: &str) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "me": me,
                "access_token": access_token,
                "token_type": "Bearer",
                "scope": scope,
            })))
            .mount(&self.server)
            .await;
    }

    /// Provider endpoint at `endpoint_path` answering with an OAuth error
    pub async fn mock_provider_error(&self, endpoint_path: &str, error: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": error })))
            .mount(&self.server)
            .await;
    }

    /// Provider endpoint at `endpoint_path` rejecting with an HTTP status
    pub async fn mock_provider_status(&self, endpoint_path: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(endpoint_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// Options registered as the example client
pub fn client_options(me: &str) -> Options {
    Options::new(me)
        .with_client_id(CLIENT_ID)
        .with_redirect_uri(REDIRECT_URI)
}

/// Session over the real `reqwest` transport
pub fn session(options: Options) -> IndieAuthentication {
    IndieAuthentication::new(options).expect("default transport builds")
}

/// Form-encode a single value
pub fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
