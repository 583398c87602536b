//! CLI error types.

use strato_proto::ProtoError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Gateway connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Request or connect timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Unexpected or undecodable gateway traffic.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A resource or project lookup failed.
    #[error("{0}")]
    NotFound(String),

    /// A name matched more than one resource.
    #[error("{0}")]
    Ambiguous(String),

    /// Some items of a bulk delete failed.
    #[error("{failed} of {total} {resource} failed to delete.")]
    BulkDelete {
        /// Number of failed items.
        failed: usize,
        /// Number of items attempted.
        total: usize,
        /// Plural resource noun.
        resource: &'static str,
    },

    /// Any other error reported by the gateway, passed through as-is.
    #[error("{message} (HTTP {code})")]
    Gateway {
        /// Gateway error code.
        code: u32,
        /// Gateway message.
        message: String,
    },

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtoError> for CliError {
    fn from(err: ProtoError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl CliError {
    /// Returns `true` for lookup misses.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
