//! Transport seam: plain-data requests/responses and the HTTP executor.
//!
//! # Design
//! `Request` and `Response` are plain data so the auth interceptor can
//! inspect, rewrite, and replay exchanges without touching `reqwest` types.
//! The [`Transport`] trait is the collaborator boundary: the interceptor and
//! client are generic over it, which lets unit tests drive the state machine
//! with a scripted in-memory transport while production code uses
//! [`HttpTransport`] over a pooled `reqwest::Client`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::TransportError;
use crate::method::Method;

/// An HTTP request described as plain data.
///
/// Immutable once sent; the auth interceptor derives a fresh value for the
/// replay instead of mutating the original.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the client's base URL, starting with `/`. May carry
    /// a query string.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl Request {
    /// Creates a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request for `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns a copy of this request with `defaults` merged beneath its
    /// own headers. Request-specific headers win on conflict; unrelated
    /// caller headers are preserved untouched.
    pub(crate) fn with_default_headers(&self, defaults: &BTreeMap<String, String>) -> Self {
        let mut merged = defaults.clone();
        merged.extend(self.headers.clone());
        Self {
            method: self.method,
            path: self.path.clone(),
            headers: merged,
            body: self.body.clone(),
        }
    }
}

// Bodies can carry login credentials and headers can carry tokens; neither
// belongs in debug output.
impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Parsed JSON body; a non-JSON body is kept as a JSON string so error
    /// messages survive, and an empty body is `None`.
    pub body: Option<Value>,
}

impl Response {
    /// Extracts the service's `error.message` body field, if present.
    pub fn error_message(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// The collaborator that performs one HTTP exchange.
///
/// Implementations do not retry; classification of non-success statuses is
/// the caller's concern. A [`TransportError`] means the exchange could not
/// be completed at all.
pub trait Transport: Send + Sync {
    /// Executes `request` and returns the normalized response.
    fn execute(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

/// [`Transport`] implementation over a pooled `reqwest::Client`.
///
/// The full URL is the base URL (with any path prefix preserved) plus the
/// request path, joined textually.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn full_url(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError> {
        let url = self.full_url(&request.path)?;
        debug!(http.method = %request.method, http.url = %url, "executing request");

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
            headers.insert(name, value);
        }

        let mut builder = self.client.request(request.method.to_reqwest(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.headers(headers).send().await?;

        let status = response.status().as_u16();
        debug!(http.status_code = status, "response received");

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            // Keep non-JSON bodies as a string so status messages survive.
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };

        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_headers_merge_under_request_headers() {
        let mut defaults = BTreeMap::new();
        defaults.insert("Authorization".to_string(), "cached-token".to_string());
        defaults.insert("X-Trace".to_string(), "abc".to_string());

        let request = Request::get("/widgets")
            .header("Authorization", "explicit-token")
            .header("Accept", "application/json");
        let merged = request.with_default_headers(&defaults);

        assert_eq!(merged.headers["Authorization"], "explicit-token");
        assert_eq!(merged.headers["X-Trace"], "abc");
        assert_eq!(merged.headers["Accept"], "application/json");
        // the original request is untouched
        assert!(!request.headers.contains_key("X-Trace"));
    }

    #[test]
    fn error_message_extraction() {
        let response = Response {
            status: 400,
            body: Some(json!({"error": {"message": "id is required"}})),
        };
        assert_eq!(response.error_message().as_deref(), Some("id is required"));

        let bare = Response {
            status: 500,
            body: Some(Value::String("boom".to_string())),
        };
        assert_eq!(bare.error_message(), None);
    }

    #[test]
    fn debug_output_redacts_body_and_header_values() {
        let request = Request::post("/auth/login")
            .header("Authorization", "secret-token")
            .json(json!({"password": "hunter2"}));
        let printed = format!("{request:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("secret-token"));
    }

    #[tokio::test]
    async fn executes_request_and_parses_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .and(header("x-tenant", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
        );
        let response = transport
            .execute(&Request::get("/widgets").header("x-tenant", "t1"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(json!([{"id": 1}])));
    }

    #[tokio::test]
    async fn sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"user": "u", "password": "p"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "tok"})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
        );
        let response = transport
            .execute(&Request::post("/auth/login").json(json!({"user": "u", "password": "p"})))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(json!({"id": "tok"})));
    }

    #[tokio::test]
    async fn empty_body_is_none_and_text_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
        );

        let empty = transport.execute(&Request::get("/empty")).await.unwrap();
        assert_eq!(empty.body, None);

        let text = transport.execute(&Request::get("/text")).await.unwrap();
        assert_eq!(text.status, 500);
        assert_eq!(text.body, Some(Value::String("boom".to_string())));
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/api/v1", server.uri())).unwrap();
        let transport = HttpTransport::new(reqwest::Client::new(), base);
        let response = transport.execute(&Request::get("/widgets")).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
