//! Authentication errors.

use thiserror::Error;

/// The login exchange failed and the original request cannot be recovered.
///
/// Error text never echoes the submitted credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service rejected the login request itself with a 401. Terminal:
    /// retrying the login would loop.
    #[error("authentication rejected (status {status})")]
    Rejected {
        /// Always 401 in practice; carried for caller inspection.
        status: u16,
    },

    /// The login succeeded but the response body carried no token.
    #[error("login response did not contain a token")]
    MissingToken,
}
