//! Error types for the core record model.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the core record model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Payload could not be encoded to CBOR.
    #[error("payload encode error: {0}")]
    Encode(String),

    /// Payload could not be decoded from CBOR.
    #[error("payload decode error: {0}")]
    Decode(String),
}
