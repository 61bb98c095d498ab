use async_trait::async_trait;

use crate::error::{RemoteError, RemoteResult};
use crate::types::{ContentInfoMap, Credential, FileInfo};

/// Remote file service - every call the host makes against the file store
///
/// Paths are relative and `/`-separated (`games/0001/out/all`). Every call
/// names the [`Credential`] it runs under; implementations must not keep
/// identity state between calls.
///
/// Write operations have default implementations that report "not
/// supported", so read-only services only implement the first four.
#[async_trait]
pub trait FileService: Send + Sync {
    /// List a directory
    async fn list(&self, who: &Credential, dir: &str) -> RemoteResult<ContentInfoMap>;

    /// Get metadata of one entry
    async fn stat(&self, who: &Credential, path: &str) -> RemoteResult<FileInfo>;

    /// Read an entire file
    async fn get(&self, who: &Credential, path: &str) -> RemoteResult<Vec<u8>>;

    /// Check whether a path exists
    async fn exists(&self, who: &Credential, path: &str) -> RemoteResult<bool> {
        match self.stat(who, path).await {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Optional operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Write an entire file (create or overwrite)
    async fn put(&self, _who: &Credential, _path: &str, _data: &[u8]) -> RemoteResult<()> {
        Err(RemoteError::Failure("put not supported by this service".into()))
    }

    /// Create a directory (parent must exist)
    async fn create_directory(&self, _who: &Credential, _path: &str) -> RemoteResult<()> {
        Err(RemoteError::Failure(
            "create_directory not supported by this service".into(),
        ))
    }

    /// Grant `access` (a subset of `"rwl"`) on a directory to a user
    async fn set_permissions(
        &self,
        _who: &Credential,
        _dir: &str,
        _user: &str,
        _access: &str,
    ) -> RemoteResult<()> {
        Err(RemoteError::Failure(
            "set_permissions not supported by this service".into(),
        ))
    }
}

/// Join a directory and a child name with `/`
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}
