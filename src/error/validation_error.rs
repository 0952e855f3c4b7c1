//! Response shape and deserialization errors.

use thiserror::Error;

/// The response arrived but its body did not have the expected shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A collection query returned something other than a JSON array.
    #[error("expected a JSON array of rows, got {found}")]
    NotRows {
        /// Short description of what the body actually was.
        found: String,
    },

    /// A row could not be deserialized into the requested entity type.
    #[error("row deserialization failed: {0}")]
    Row(#[from] serde_json::Error),
}
