//! Errors reported by the remote service.

use thiserror::Error;

/// The service answered with a status >= 400 that the client could not
/// recover from.
///
/// Carries the numeric status and a best-effort message: the service's
/// `error.message` body field when present, else `"error status: <code>"`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// The HTTP status code of the final response.
    pub status: u16,
    /// Message extracted from the response body, or a generic fallback.
    pub message: String,
}

impl RemoteError {
    /// Creates a remote error, falling back to `"error status: <code>"`
    /// when the service supplied no message.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self {
            status,
            message: message.unwrap_or_else(|| format!("error status: {status}")),
        }
    }
}
