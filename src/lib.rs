//! Data-access client for LoopBack-style REST resource collections.
//!
//! The crate exposes a small query vocabulary (filter-by-field, limit,
//! offset), translates it to the service's bracket-notation query-string
//! encoding, and transparently recovers from expired or missing credentials
//! by re-authenticating and replaying the failed request exactly once.
//!
//! ## Features
//!
//! - **Pure filter translation**: a [`Filter`] renders deterministically to
//!   the wire form (`?filter[where][id]=1&filter[limit]=1`)
//! - **401 recovery**: per-client credential cache, single-flight
//!   re-authentication, single bounded replay
//! - **Async-first HTTP**: built on `reqwest` with `tokio`
//! - **Layered error handling**: structured errors per failure mode
//!
//! ## Example
//!
//! ```rust,ignore
//! use loopback_datastore::{AuthConfig, DatastoreClient, Filter};
//! use serde_json::{json, Value};
//! use url::Url;
//!
//! let client = DatastoreClient::builder(Url::parse("https://api.example.com")?)
//!     .auth(AuthConfig::new("/users/login", json!({"email": "e", "password": "p"})))
//!     .build()?;
//!
//! let active = Filter::new().eq("status", "active").limit(10);
//! let rows: Vec<Value> = client.find("widgets", Some(&active)).await?;
//! let widget: Option<Value> = client.get("widgets", 1).await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod filter;
pub mod method;
pub mod transport;

// Re-exports for convenience
pub use auth::{AuthConfig, AuthInterceptor};
pub use client::{DatastoreClient, DatastoreClientBuilder};
pub use error::{AuthError, DatastoreError, RemoteError, TransportError, ValidationError};
pub use filter::Filter;
pub use method::Method;
pub use transport::{HttpTransport, Request, Response, Transport};
