//! Layered error types for the datastore client.
//!
//! The hierarchy mirrors the failure taxonomy of the client:
//! - [`DatastoreError`] - Top-level error type for all operations
//! - [`TransportError`] - Network-level failures; never retried
//! - [`RemoteError`] - Final HTTP status >= 400 from the service
//! - [`AuthError`] - The login exchange itself failed
//! - [`ValidationError`] - Response body shape / deserialization failures

mod auth_error;
mod datastore_error;
mod remote_error;
mod transport_error;
mod validation_error;

pub use auth_error::AuthError;
pub use datastore_error::DatastoreError;
pub use remote_error::RemoteError;
pub use transport_error::TransportError;
pub use validation_error::ValidationError;
