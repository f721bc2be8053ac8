//! Centralized error types for the Warden workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to the failure classes callers act on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WardenError {
    /// A referenced group or resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The entity store errored or was unreachable. Never retried here.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Whether the caller supplied something wrong (vs. a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, WardenError::NotFound(_) | WardenError::InvalidInput(_))
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
