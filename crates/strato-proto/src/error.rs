//! Error types for the strato-proto crate.

use thiserror::Error;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Failed to encode a message.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Failed to decode a message.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A field had a value of the wrong shape.
    #[error("invalid value for field '{field}': expected {expected}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Description of the expected shape.
        expected: &'static str,
    },
}
