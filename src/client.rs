//! The public datastore client.
//!
//! [`DatastoreClient`] composes the filter translation, the optional auth
//! interceptor, and the HTTP transport into the two public operations:
//! [`find`](DatastoreClient::find) and [`get`](DatastoreClient::get).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, Span};
use url::Url;

use crate::auth::{AuthConfig, AuthInterceptor};
use crate::error::{DatastoreError, RemoteError, TransportError, ValidationError};
use crate::filter::{self, Filter};
use crate::transport::{HttpTransport, Request, Response, Transport};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring a [`DatastoreClient`].
#[derive(Debug)]
pub struct DatastoreClientBuilder {
    base_url: Url,
    timeout: Duration,
    default_headers: BTreeMap<String, String>,
    auth: Option<AuthConfig>,
}

impl DatastoreClientBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: BTreeMap::new(),
            auth: None,
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent on every request. Request-specific headers win on
    /// conflict.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Enables credential recovery: on a 401 the client re-authenticates
    /// against `config.login_path` and replays the failed request once.
    ///
    /// Without this, a 401 surfaces like any other error status.
    pub fn auth(mut self, config: AuthConfig) -> Self {
        self.auth = Some(config);
        self
    }

    /// Builds the [`DatastoreClient`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<DatastoreClient, DatastoreError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(TransportError::Request)?;
        let transport = HttpTransport::new(client, self.base_url);
        let dispatch = match self.auth {
            Some(config) => Dispatch::Auth(AuthInterceptor::new(transport, config)),
            None => Dispatch::Plain(transport),
        };
        Ok(DatastoreClient {
            dispatch,
            default_headers: self.default_headers,
        })
    }
}

/// The send chain: either the bare transport or the auth-wrapped one.
#[derive(Debug)]
enum Dispatch {
    Plain(HttpTransport),
    Auth(AuthInterceptor<HttpTransport>),
}

impl Dispatch {
    async fn send(&self, request: &Request) -> Result<Response, DatastoreError> {
        match self {
            Self::Plain(transport) => transport.execute(request).await.map_err(Into::into),
            Self::Auth(interceptor) => interceptor.send(request).await,
        }
    }
}

/// Async client for a LoopBack-style REST resource collection.
///
/// Each client owns its credential cache; clients pointed at different
/// endpoints or credentials do not share auth state.
///
/// ## Examples
///
/// ```rust,ignore
/// use loopback_datastore::{AuthConfig, DatastoreClient, Filter};
/// use serde_json::{json, Value};
/// use url::Url;
///
/// let client = DatastoreClient::builder(Url::parse("https://api.example.com")?)
///     .auth(AuthConfig::new("/users/login", json!({"email": "e", "password": "p"})))
///     .build()?;
///
/// let filter = Filter::new().eq("status", "active").limit(10);
/// let rows: Vec<Value> = client.find("widgets", Some(&filter)).await?;
/// let one: Option<Value> = client.get("widgets", 1).await?;
/// ```
#[derive(Debug)]
pub struct DatastoreClient {
    dispatch: Dispatch,
    default_headers: BTreeMap<String, String>,
}

impl DatastoreClient {
    /// Creates a new builder for configuring a client.
    pub fn builder(base_url: Url) -> DatastoreClientBuilder {
        DatastoreClientBuilder::new(base_url)
    }

    /// Creates a client with default settings and no authentication.
    pub fn new(base_url: Url) -> Result<Self, DatastoreError> {
        Self::builder(base_url).build()
    }

    /// Retrieves the rows of `collection` matching `filter`.
    ///
    /// An absent body yields an empty vec. Rows are deserialized into `T`;
    /// use `serde_json::Value` for schemaless access. No entity-shape
    /// validation happens here; that is the service's contract.
    ///
    /// ## Errors
    ///
    /// A final status >= 400 (other than a recovered 401) becomes
    /// [`RemoteError`] carrying the status and the body's `error.message`
    /// field when present.
    #[instrument(
        name = "datastore_find",
        skip(self, filter),
        fields(http.status_code = tracing::field::Empty)
    )]
    pub async fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<T>, DatastoreError> {
        let query = filter::query_string(filter);
        let request =
            Request::get(format!("/{collection}{query}")).with_default_headers(&self.default_headers);
        let response = self.dispatch.send(&request).await?;
        Span::current().record("http.status_code", response.status);

        if response.status > 399 {
            return Err(RemoteError::new(response.status, response.error_message()).into());
        }
        match response.body {
            None => Ok(Vec::new()),
            Some(Value::Array(rows)) => rows
                .into_iter()
                .map(|row| serde_json::from_value(row).map_err(|e| ValidationError::Row(e).into()))
                .collect(),
            Some(other) => Err(ValidationError::NotRows {
                found: json_kind(&other).to_string(),
            }
            .into()),
        }
    }

    /// Retrieves one row of `collection` by its `id`.
    ///
    /// Returns `None` when no row matches; "no matching row" is not an
    /// error, unlike transport or auth failures.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: impl Into<Value>,
    ) -> Result<Option<T>, DatastoreError> {
        let matching = Filter::new().eq("id", id).limit(1);
        let mut rows: Vec<T> = self.find(collection, Some(&matching)).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> DatastoreClient {
        DatastoreClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn find_returns_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])),
            )
            .mount(&server)
            .await;

        let rows: Vec<Value> = client_for(&server)
            .await
            .find("widgets", None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
    }

    #[tokio::test]
    async fn find_with_absent_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let rows: Vec<Value> = client_for(&server)
            .await
            .find("widgets", None)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn find_rejects_non_array_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .find::<Value>("widgets", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatastoreError::Validation(ValidationError::NotRows { .. })
        ));
    }

    #[tokio::test]
    async fn default_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .and(header("x-tenant", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = DatastoreClient::builder(Url::parse(&server.uri()).unwrap())
            .default_header("X-Tenant", "t1")
            .build()
            .unwrap();
        let rows: Vec<Value> = client.find("widgets", None).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn error_status_uses_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"error": {"message": "name is required"}})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .find::<Value>("widgets", None)
            .await
            .unwrap_err();
        match err {
            DatastoreError::Remote(remote) => {
                assert_eq!(remote.status, 422);
                assert_eq!(remote.to_string(), "name is required");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthenticated_client_surfaces_401_as_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .find::<Value>("widgets", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert!(matches!(err, DatastoreError::Remote(_)));
    }
}
