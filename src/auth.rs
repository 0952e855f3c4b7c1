//! Credential cache and the 401 re-authentication state machine.
//!
//! # Design
//! [`AuthInterceptor`] wraps a [`Transport`] and recovers from rejected
//! credentials: on a 401 it discards the cached credential, performs the
//! login exchange, and replays the original request exactly once. The replay
//! bound is straight-line control flow, not recursion depth: the login goes
//! through the transport directly, and a 401 on the replay is returned to
//! the caller as an ordinary response.
//!
//! # Concurrency
//! Re-authentication is single-flight. The per-client credential cache sits
//! behind a `tokio::sync::Mutex`; the first caller to observe a 401 clears
//! the cache and logs in while holding the lock. A concurrent caller that
//! observes a 401 with a stale credential snapshot finds the cache already
//! refreshed when it acquires the lock, skips its own login, and replays
//! with the new credential. A stale login can no longer overwrite a newer
//! credential.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AuthError, DatastoreError, RemoteError};
use crate::method::Method;
use crate::transport::{Request, Response, Transport};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// Login configuration supplied once at client construction.
#[derive(Clone)]
pub struct AuthConfig {
    /// Path of the login endpoint, relative to the base URL.
    pub login_path: String,
    /// Opaque credential payload POSTed as the login body.
    pub credentials: Value,
}

impl AuthConfig {
    pub fn new(login_path: impl Into<String>, credentials: Value) -> Self {
        Self {
            login_path: login_path.into(),
            credentials,
        }
    }
}

// Credentials must not leak through debug output.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

/// Per-client credential cache.
///
/// Created empty, replaced wholesale on login success, cleared on a 401
/// observed for a non-login request. Never persisted.
#[derive(Debug, Default)]
struct AuthState {
    headers: BTreeMap<String, String>,
}

/// Wraps a [`Transport`] with the 401-detect / re-authenticate / replay
/// state machine.
#[derive(Debug)]
pub struct AuthInterceptor<T> {
    transport: T,
    config: AuthConfig,
    state: Mutex<AuthState>,
}

impl<T: Transport> AuthInterceptor<T> {
    pub fn new(transport: T, config: AuthConfig) -> Self {
        Self {
            transport,
            config,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Sends `request` with cached auth headers attached, recovering from a
    /// 401 by re-authenticating and replaying once.
    ///
    /// ## Errors
    ///
    /// - [`AuthError::Rejected`] when the login exchange itself is refused.
    /// - Any transport or remote error from the login exchange.
    ///
    /// Every other status, including a 401 on the replay, is returned as an
    /// ordinary [`Response`].
    pub async fn send(&self, request: &Request) -> Result<Response, DatastoreError> {
        let snapshot = self.state.lock().await.headers.clone();
        let response = self
            .transport
            .execute(&request.with_default_headers(&snapshot))
            .await?;
        if response.status != 401 {
            return Ok(response);
        }

        // A credential that produced a 401 must not be reused.
        if self.is_login(request) {
            // The login request itself was refused: terminal, retrying the
            // login would loop.
            self.state.lock().await.headers.clear();
            return Err(AuthError::Rejected { status: 401 }.into());
        }

        let refreshed = {
            let mut state = self.state.lock().await;
            if state.headers == snapshot {
                state.headers.clear();
                debug!(login_path = %self.config.login_path, "credential rejected, re-authenticating");
                let token = self.login().await?;
                state.headers.insert(AUTHORIZATION.to_string(), token);
            } else {
                debug!("credential refreshed by a concurrent caller, replaying");
            }
            state.headers.clone()
        };

        // Exactly one replay per call; its outcome is final.
        self.transport
            .execute(&request.with_default_headers(&refreshed))
            .await
            .map_err(Into::into)
    }

    fn is_login(&self, request: &Request) -> bool {
        request.method == Method::Post && request.path == self.config.login_path
    }

    /// Performs the login exchange and returns the issued token.
    ///
    /// The token is the `id` field of the login response body and is sent
    /// verbatim as the `Authorization` header, without a `Bearer` prefix.
    async fn login(&self) -> Result<String, DatastoreError> {
        let request = Request::post(&self.config.login_path)
            .header(CONTENT_TYPE, "application/json")
            .json(self.config.credentials.clone());
        let response = self.transport.execute(&request).await?;

        if response.status == 401 {
            return Err(AuthError::Rejected { status: 401 }.into());
        }
        if response.status > 399 {
            return Err(RemoteError::new(response.status, response.error_message()).into());
        }
        response
            .body
            .as_ref()
            .and_then(|body| body.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
