//! Transport-boundary error type.

use thiserror::Error;

/// Error reported by a remote file service call.
///
/// The wire protocol only carries a status text such as
/// `"404 File not found"`. [`RemoteError::from_status_text`] is the single
/// place where that text is interpreted; everything above the transport
/// matches on the variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The addressed file or directory does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The credential may not perform the call.
    #[error("{0}")]
    PermissionDenied(String),

    /// Any other failure; the message is kept for diagnostics.
    #[error("{0}")]
    Failure(String),
}

impl RemoteError {
    /// Classify a status text received from the service.
    ///
    /// Only the leading status code is inspected, literally. This mirrors
    /// what the service's clients have always done and is kept as-is for
    /// compatibility: a text starting with `404` is absence, `401`/`403` is
    /// a permission problem, anything else is a failure.
    pub fn from_status_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.starts_with("404") {
            Self::NotFound(text)
        } else if text.starts_with("403") || text.starts_with("401") {
            Self::PermissionDenied(text)
        } else {
            Self::Failure(text)
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The underlying message
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::PermissionDenied(m) | Self::Failure(m) => m,
        }
    }
}

/// Result type for file service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status_prefix() {
        assert!(RemoteError::from_status_text("404 File not found").is_not_found());
        assert_eq!(
            RemoteError::from_status_text("403 Permission denied"),
            RemoteError::PermissionDenied("403 Permission denied".into())
        );
        assert!(matches!(
            RemoteError::from_status_text("401 Not logged in"),
            RemoteError::PermissionDenied(_)
        ));
        assert!(matches!(
            RemoteError::from_status_text("500 Internal error"),
            RemoteError::Failure(_)
        ));
    }

    #[test]
    fn only_the_literal_prefix_counts() {
        // no status code, even though the words match
        assert!(matches!(
            RemoteError::from_status_text("file not found"),
            RemoteError::Failure(_)
        ));
        assert!(matches!(
            RemoteError::from_status_text(" 404 padded"),
            RemoteError::Failure(_)
        ));
        assert_eq!(
            RemoteError::from_status_text("404 gone").message(),
            "404 gone"
        );
    }
}
