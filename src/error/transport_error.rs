//! Network-level transport errors.

use thiserror::Error;

/// Errors from the transport layer.
///
/// These represent exchanges the transport could not complete at all (DNS,
/// connection, timeout) or requests it could not construct. They are never
/// retried by the client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP exchange failed at the network or protocol level.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request path could not be joined onto the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value could not be represented on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl TransportError {
    /// Returns `true` if the failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}
