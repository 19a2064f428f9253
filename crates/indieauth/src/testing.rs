//! In-memory transport for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use http::{Method, StatusCode};
use url::Url;

use crate::transport::{
    EffectiveUrl, FetchRequest, HttpResponse, HttpTransport, RedirectMode, TransportError,
};

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

/// Routes `(method, url)` to canned responses; unknown routes answer 404
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    failures: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(
        self,
        method: Method,
        url: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Self {
        self.routes.lock().unwrap().insert(
            (method, url.to_string()),
            Canned {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn page(self, url: &str, headers: &[(&str, &str)], body: &str) -> Self {
        self.on(Method::GET, url, 200, headers, body)
    }

    pub(crate) fn redirect(self, url: &str, status: u16, location: &str) -> Self {
        self.on(Method::GET, url, status, &[("location", location)], "")
    }

    pub(crate) fn fail(self, url: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), message.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, method: &Method, url: &Url) -> Result<HttpResponse, TransportError> {
        if let Some(message) = self.failures.lock().unwrap().get(url.as_str()) {
            return Err(TransportError::Other(message.clone()));
        }

        let canned = self
            .routes
            .lock()
            .unwrap()
            .get(&(method.clone(), url.to_string()))
            .cloned()
            .unwrap_or(Canned {
                status: 404,
                headers: Vec::new(),
                body: String::new(),
            });

        let mut builder = http::Response::builder().status(canned.status);
        for (name, value) in &canned.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(canned.body.into_bytes())
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: FetchRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut url = request.url.clone();
        let mut response = self.respond(&request.method, &url)?;

        if request.redirect == RedirectMode::Follow {
            for _ in 0..10 {
                if !response.status().is_redirection() || response.status() == StatusCode::NOT_MODIFIED
                {
                    break;
                }
                let Some(location) = response
                    .headers()
                    .get(http::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| url.join(v).ok())
                else {
                    break;
                };
                url = location;
                response = self.respond(&Method::GET, &url)?;
            }
        }

        response.extensions_mut().insert(EffectiveUrl(url));
        Ok(response)
    }
}
