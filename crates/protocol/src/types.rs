//! Metadata and identity types shared by every file service call.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of a remote directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Anything the service could not classify.
    Unknown,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns true if this is a directory.
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Metadata of one remote entry as reported by `list` or `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file_type: FileType,
    /// Size in bytes, if the service reported one.
    pub size: Option<u64>,
}

impl FileInfo {
    /// Metadata for a regular file of known size
    pub const fn file(size: u64) -> Self {
        Self {
            file_type: FileType::File,
            size: Some(size),
        }
    }

    /// Metadata for a directory
    pub const fn directory() -> Self {
        Self {
            file_type: FileType::Directory,
            size: None,
        }
    }
}

/// Result of one directory listing, ordered by name.
pub type ContentInfoMap = BTreeMap<String, FileInfo>;

/// Identity a remote call runs under.
///
/// The wire protocol represents the administrator as an empty user id;
/// [`Credential::from_user_id`] and [`Credential::user_id`] convert between
/// the two forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Credential {
    Admin,
    User(String),
}

impl Credential {
    /// Parse a wire user id (empty means admin)
    pub fn from_user_id(user_id: &str) -> Self {
        if user_id.is_empty() {
            Self::Admin
        } else {
            Self::User(user_id.to_string())
        }
    }

    /// Wire form of this identity
    pub fn user_id(&self) -> &str {
        match self {
            Self::Admin => "",
            Self::User(id) => id,
        }
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// True if this is the given (non-admin) user
    pub fn is_user(&self, user_id: &str) -> bool {
        matches!(self, Self::User(id) if id == user_id)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("<admin>"),
            Self::User(id) => f.write_str(id),
        }
    }
}
