//! Error taxonomy for the memory engine.

use crate::types::Tier;

/// Result type alias used throughout the memory engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced by tiers, the router, the code index, and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup target absent (get/update/delete/promote).
    #[error("not found: {0}")]
    NotFound(String),

    /// Update attempted on L1, promote attempted past L3, or a demote was requested.
    #[error("unsupported transition: {0}")]
    UnsupportedTransition(String),

    /// Malformed input: unknown tier id, empty required field, invalid IANA zone, etc.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Underlying database failure, tagged with the tier and operation that failed.
    #[error("storage error in {tier:?}::{op}: {message}")]
    StorageError {
        tier: Tier,
        op: &'static str,
        message: String,
    },

    /// Model initialization or inference failed while the embedding circuit is open.
    #[error("embedding service unavailable")]
    EmbeddingUnavailable,

    /// Deadline exceeded or explicit cancel.
    #[error("operation cancelled")]
    Cancelled,

    /// Unparseable persisted JSON or embedding. Normally logged and skipped; surfaced
    /// only when the entire operation cannot complete without it.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an underlying storage failure with the tier and operation it occurred in.
    pub fn storage(tier: Tier, op: &'static str, message: impl Into<String>) -> Self {
        Error::StorageError {
            tier,
            op,
            message: message.into(),
        }
    }

    /// Whether this error reflects a condition that can be retried by the caller.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StorageError { .. } | Error::EmbeddingUnavailable | Error::Cancelled
        )
    }
}

/// `{ok: false, error: {kind, message}}` response shape for user-visible failures (§7).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        let kind = match err {
            Error::NotFound(_) => "NotFound",
            Error::UnsupportedTransition(_) => "UnsupportedTransition",
            Error::ValidationError(_) => "ValidationError",
            Error::StorageError { .. } => "StorageError",
            Error::EmbeddingUnavailable => "EmbeddingUnavailable",
            Error::Cancelled => "Cancelled",
            Error::CorruptData(_) => "CorruptData",
            Error::Serialization(_) => "ValidationError",
            Error::Io(_) => "StorageError",
        };
        ErrorResponse {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }
}
