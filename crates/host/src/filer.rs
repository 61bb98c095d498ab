//! File service over a local directory
//!
//! Serves a directory on disk as the remote file store. Paths are resolved
//! inside a sandbox root; anything that would escape it is refused. Users
//! get read access to the whole store, only the administrator may write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use game_host_protocol::{
    ContentInfoMap, Credential, FileInfo, FileService, FileType, RemoteError, RemoteResult,
};
use tracing::debug;

/// Local filesystem file service
pub struct LocalFileService {
    root: PathBuf,
}

impl LocalFileService {
    /// Serve `root`, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path to a filesystem path inside the sandbox
    ///
    /// The path need not exist. If it does, its real location must stay
    /// below the root.
    fn resolve(&self, path: &str) -> RemoteResult<PathBuf> {
        if path.starts_with('/')
            || path.contains('\\')
            || path.split('/').any(|s| s == ".." || s == ".")
        {
            return Err(RemoteError::Failure(format!("400 Invalid path '{path}'")));
        }
        let target = if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        };

        match target.canonicalize() {
            Ok(real) if real.starts_with(&self.root) => Ok(real),
            Ok(_) => Err(RemoteError::PermissionDenied(format!(
                "403 {path}: outside the file store"
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(target),
            Err(e) => Err(io_error(path, &e)),
        }
    }

    /// Resolve the target of a write; its parent must already exist
    ///
    /// The target itself must not be a symlink, dangling or not: writing
    /// would follow it.
    fn resolve_new(&self, who: &Credential, path: &str) -> RemoteResult<PathBuf> {
        if let Credential::User(user) = who {
            return Err(RemoteError::PermissionDenied(format!(
                "403 {path}: read-only for {user}"
            )));
        }
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        if name.is_empty() {
            return Err(RemoteError::Failure(format!("400 Invalid path '{path}'")));
        }
        let parent_dir = self.resolve(parent)?;
        if !parent_dir.is_dir() {
            return Err(RemoteError::NotFound(format!("404 {parent}: no such directory")));
        }
        let target = parent_dir.join(name);
        if fs::symlink_metadata(&target).is_ok_and(|meta| meta.file_type().is_symlink()) {
            return Err(RemoteError::PermissionDenied(format!(
                "403 {path}: refusing to write through a symlink"
            )));
        }
        Ok(target)
    }
}

fn io_error(path: &str, e: &io::Error) -> RemoteError {
    match e.kind() {
        io::ErrorKind::NotFound => RemoteError::NotFound(format!("404 {path}: not found")),
        io::ErrorKind::PermissionDenied => RemoteError::PermissionDenied(format!("403 {path}: {e}")),
        io::ErrorKind::AlreadyExists => RemoteError::Failure(format!("409 {path}: already exists")),
        _ => RemoteError::Failure(format!("500 {path}: {e}")),
    }
}

fn file_info(meta: &fs::Metadata) -> FileInfo {
    if meta.is_file() {
        FileInfo::file(meta.len())
    } else if meta.is_dir() {
        FileInfo::directory()
    } else {
        FileInfo {
            file_type: FileType::Unknown,
            size: None,
        }
    }
}

/// Run filesystem work off the async executor
async fn blocking<T, F>(work: F) -> RemoteResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RemoteResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RemoteError::Failure(format!("500 {e}")))?
}

#[async_trait]
impl FileService for LocalFileService {
    async fn list(&self, who: &Credential, dir: &str) -> RemoteResult<ContentInfoMap> {
        debug!(%who, dir, "list");
        let resolved = self.resolve(dir)?;
        let dir = dir.to_string();
        blocking(move || {
            let meta = fs::metadata(&resolved).map_err(|e| io_error(&dir, &e))?;
            if !meta.is_dir() {
                return Err(RemoteError::Failure(format!("400 {dir}: not a directory")));
            }
            let mut entries = ContentInfoMap::new();
            for entry in fs::read_dir(&resolved).map_err(|e| io_error(&dir, &e))? {
                let entry = entry.map_err(|e| io_error(&dir, &e))?;
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                // follows symlinks; dangling ones are skipped
                if let Ok(meta) = fs::metadata(entry.path()) {
                    entries.insert(name, file_info(&meta));
                }
            }
            Ok(entries)
        })
        .await
    }

    async fn stat(&self, who: &Credential, path: &str) -> RemoteResult<FileInfo> {
        debug!(%who, path, "stat");
        let resolved = self.resolve(path)?;
        let path = path.to_string();
        blocking(move || {
            fs::metadata(&resolved)
                .map(|meta| file_info(&meta))
                .map_err(|e| io_error(&path, &e))
        })
        .await
    }

    async fn get(&self, who: &Credential, path: &str) -> RemoteResult<Vec<u8>> {
        debug!(%who, path, "get");
        let resolved = self.resolve(path)?;
        let path = path.to_string();
        blocking(move || {
            if resolved.is_dir() {
                return Err(RemoteError::Failure(format!("400 {path}: is a directory")));
            }
            fs::read(&resolved).map_err(|e| io_error(&path, &e))
        })
        .await
    }

    async fn put(&self, who: &Credential, path: &str, data: &[u8]) -> RemoteResult<()> {
        debug!(%who, path, size = data.len(), "put");
        let resolved = self.resolve_new(who, path)?;
        let path = path.to_string();
        let data = data.to_vec();
        blocking(move || fs::write(&resolved, data).map_err(|e| io_error(&path, &e))).await
    }

    async fn create_directory(&self, who: &Credential, path: &str) -> RemoteResult<()> {
        debug!(%who, path, "mkdir");
        let resolved = self.resolve_new(who, path)?;
        let path = path.to_string();
        blocking(move || fs::create_dir(&resolved).map_err(|e| io_error(&path, &e))).await
    }
}
