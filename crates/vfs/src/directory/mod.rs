//! Hierarchical directory view of the file service
//!
//! [`Directory`] and [`DirectoryEntry`] are the interface local code uses to
//! read files without caring where they live. Every failure is a
//! [`FileProblem`], which tells "missing" apart from everything else.

mod client;
mod spec;

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{FileInfo, RemoteError};
use thiserror::Error;

use crate::error::ItemError;

pub use client::ClientDirectory;
pub use spec::SpecDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// The file or directory does not exist
    Missing,
    Other,
}

/// Failure of a directory operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct FileProblem {
    pub path: String,
    pub message: String,
    pub kind: ProblemKind,
}

impl FileProblem {
    pub fn missing(path: &str) -> Self {
        Self {
            path: path.to_string(),
            message: "file not found".into(),
            kind: ProblemKind::Missing,
        }
    }

    pub fn other(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            kind: ProblemKind::Other,
        }
    }

    /// Translate a remote failure on `path`
    pub fn from_remote(path: &str, e: &RemoteError) -> Self {
        let kind = if e.is_not_found() {
            ProblemKind::Missing
        } else {
            ProblemKind::Other
        };
        Self {
            path: path.to_string(),
            message: e.message().to_string(),
            kind,
        }
    }

    pub fn read_only(path: &str) -> Self {
        Self::other(path, "directory is read-only")
    }

    pub fn is_missing(&self) -> bool {
        self.kind == ProblemKind::Missing
    }
}

impl From<FileProblem> for ItemError {
    fn from(e: FileProblem) -> Self {
        match e.kind {
            ProblemKind::Missing => Self::NotFound(e.to_string()),
            ProblemKind::Other => Self::Remote(e.to_string()),
        }
    }
}

pub type DirResult<T> = Result<T, FileProblem>;

/// Buffered content of a file opened for reading
pub type FileStream = Cursor<Vec<u8>>;

/// Directory title for a remote path: its last segment
pub(crate) fn title_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A directory
#[async_trait]
pub trait Directory: Send + Sync {
    /// Display name
    fn title(&self) -> &str;

    /// Local filesystem path, if there is one
    fn path_name(&self) -> Option<String> {
        None
    }

    fn parent(&self) -> Option<Arc<dyn Directory>>;

    /// Look up an entry; the entry need not exist
    async fn entry(&self, name: &str) -> DirResult<Arc<dyn DirectoryEntry>>;

    /// All entries
    async fn entries(&self) -> DirResult<Vec<Arc<dyn DirectoryEntry>>>;

    /// Open a file for reading
    async fn open_file(&self, name: &str) -> DirResult<FileStream> {
        self.entry(name).await?.open_for_reading().await
    }

    /// Open a file for reading; a missing file is `Ok(None)`
    async fn open_file_nt(&self, name: &str) -> DirResult<Option<FileStream>> {
        match self.open_file(name).await {
            Ok(stream) => Ok(Some(stream)),
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// One entry of a [`Directory`]
#[async_trait]
pub trait DirectoryEntry: Send + Sync {
    fn title(&self) -> &str;

    fn path_name(&self) -> Option<String> {
        None
    }

    /// Metadata (type and size)
    async fn info(&self) -> DirResult<FileInfo>;

    async fn open_for_reading(&self) -> DirResult<FileStream>;

    async fn open_directory(&self) -> DirResult<Arc<dyn Directory>>;

    async fn write(&self, _data: &[u8]) -> DirResult<()> {
        Err(FileProblem::read_only(self.title()))
    }

    async fn erase(&self) -> DirResult<()> {
        Err(FileProblem::read_only(self.title()))
    }

    async fn create_as_directory(&self) -> DirResult<()> {
        Err(FileProblem::read_only(self.title()))
    }
}
