//! Top-level datastore error type.

use super::{AuthError, RemoteError, TransportError, ValidationError};
use thiserror::Error;

/// Top-level error type for all datastore operations.
///
/// Aggregates the error categories so callers can handle failures uniformly
/// while still matching on a specific category when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use loopback_datastore::DatastoreError;
///
/// fn handle(err: DatastoreError) {
///     match err {
///         DatastoreError::Transport(e) => eprintln!("network: {e}"),
///         DatastoreError::Remote(e) => eprintln!("service: {e}"),
///         DatastoreError::Auth(e) => eprintln!("login: {e}"),
///         DatastoreError::Validation(e) => eprintln!("response shape: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// Underlying network/transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Authentication failed outright.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The response body did not have the expected shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DatastoreError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote(e) => Some(e.status),
            Self::Auth(AuthError::Rejected { status }) => Some(*status),
            _ => None,
        }
    }
}
