//! Item error types.

use game_host_protocol::RemoteError;
use thiserror::Error;

/// Error produced by item operations and path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// Path segment, game, turn or file does not exist (or is not visible).
    #[error("not found: {0}")]
    NotFound(String),

    /// The session may not access the node.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Operation does not fit the node kind (reading a directory, listing a file).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Remote file service or record store failure.
    #[error("remote failure: {0}")]
    Remote(String),
}

impl ItemError {
    /// Create a NotFound error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(what: impl Into<String>) -> Self {
        Self::PermissionDenied(what.into())
    }

    /// Create an InvalidOperation error.
    pub fn invalid_operation(what: impl Into<String>) -> Self {
        Self::InvalidOperation(what.into())
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<RemoteError> for ItemError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::NotFound(msg) => Self::NotFound(msg),
            RemoteError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            RemoteError::Failure(msg) => Self::Remote(msg),
        }
    }
}

/// Item result type.
pub type ItemResult<T> = Result<T, ItemError>;
