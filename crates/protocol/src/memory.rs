//! In-memory file service for testing
//!
//! Provides an ephemeral file store with the same permission model and
//! status-text errors as the real service. Every call is recorded so tests
//! can count remote round trips.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{RemoteError, RemoteResult};
use crate::service::FileService;
use crate::types::{ContentInfoMap, Credential, FileInfo};

/// In-memory entry
#[derive(Clone, Debug)]
enum MemoryEntry {
    File(Vec<u8>),
    Directory(DirectoryAcl),
}

#[derive(Clone, Debug, Default)]
struct DirectoryAcl {
    /// Owning user; `None` for directories created by the admin
    owner: Option<String>,
    /// user -> access letters (`r`ead, `w`rite, `l`ist)
    access: HashMap<String, String>,
}

/// One recorded call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteCall {
    pub op: &'static str,
    pub path: String,
    pub user: String,
}

/// In-memory file service
///
/// Thread-safe via internal `RwLock`. The root directory `""` always exists
/// and belongs to the admin.
pub struct MemoryFileService {
    entries: RwLock<BTreeMap<String, MemoryEntry>>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl Default for MemoryFileService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileService {
    /// Create a new empty service
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(String::new(), MemoryEntry::Directory(DirectoryAcl::default()));
        Self {
            entries: RwLock::new(entries),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create with initial file contents (parents are created as admin directories)
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        for (path, content) in files {
            fs.insert_file(path.as_ref(), content.as_ref());
        }
        fs
    }

    /// Add a file outside the call log, creating parent directories
    pub fn insert_file(&self, path: &str, content: &[u8]) {
        let path = normalize(path);
        if let Ok(mut entries) = self.entries.write() {
            let parts: Vec<&str> = path.split('/').collect();
            let mut current = String::new();
            for part in &parts[..parts.len().saturating_sub(1)] {
                current = if current.is_empty() {
                    (*part).to_string()
                } else {
                    format!("{current}/{part}")
                };
                entries
                    .entry(current.clone())
                    .or_insert_with(|| MemoryEntry::Directory(DirectoryAcl::default()));
            }
            entries.insert(path, MemoryEntry::File(content.to_vec()));
        }
    }

    /// All calls made so far, oldest first
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls of one kind (`"list"`, `"stat"`, `"get"`, ...)
    pub fn call_count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, op: &'static str, who: &Credential, path: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RemoteCall {
                op,
                path: path.to_string(),
                user: who.user_id().to_string(),
            });
        }
    }

    fn read_entries(&self) -> RemoteResult<RwLockReadGuard<'_, BTreeMap<String, MemoryEntry>>> {
        self.entries
            .read()
            .map_err(|_| RemoteError::from_status_text("500 Lock poisoned"))
    }

    fn write_entries(&self) -> RemoteResult<RwLockWriteGuard<'_, BTreeMap<String, MemoryEntry>>> {
        self.entries
            .write()
            .map_err(|_| RemoteError::from_status_text("500 Lock poisoned"))
    }
}

/// Strip leading and trailing slashes
fn normalize(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn not_found() -> RemoteError {
    RemoteError::from_status_text("404 File not found")
}

fn denied() -> RemoteError {
    RemoteError::from_status_text("403 Permission denied")
}

/// Check `mode` access on directory `dir`
fn check_access(
    entries: &BTreeMap<String, MemoryEntry>,
    who: &Credential,
    dir: &str,
    mode: char,
) -> RemoteResult<()> {
    let acl = match entries.get(dir) {
        Some(MemoryEntry::Directory(acl)) => acl,
        Some(MemoryEntry::File(_)) => {
            return Err(RemoteError::from_status_text("405 Not a directory"))
        }
        None => return Err(not_found()),
    };
    match who {
        Credential::Admin => Ok(()),
        Credential::User(user) => {
            let owner = acl.owner.as_deref() == Some(user.as_str());
            let granted = acl.access.get(user).is_some_and(|a| a.contains(mode));
            if owner || granted {
                Ok(())
            } else {
                Err(denied())
            }
        }
    }
}

fn info_of(entry: &MemoryEntry) -> FileInfo {
    match entry {
        MemoryEntry::File(data) => FileInfo::file(data.len() as u64),
        MemoryEntry::Directory(_) => FileInfo::directory(),
    }
}

#[async_trait]
impl FileService for MemoryFileService {
    async fn list(&self, who: &Credential, dir: &str) -> RemoteResult<ContentInfoMap> {
        let dir = normalize(dir);
        self.record("list", who, &dir);
        let entries = self.read_entries()?;
        check_access(&entries, who, &dir, 'l')?;

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let mut result = ContentInfoMap::new();
        for (key, entry) in entries.range(prefix.clone()..) {
            let Some(remainder) = key.strip_prefix(&prefix) else {
                break;
            };
            // Only direct children
            if !remainder.is_empty() && !remainder.contains('/') {
                result.insert(remainder.to_string(), info_of(entry));
            }
        }
        Ok(result)
    }

    async fn stat(&self, who: &Credential, path: &str) -> RemoteResult<FileInfo> {
        let path = normalize(path);
        self.record("stat", who, &path);
        let entries = self.read_entries()?;
        let entry = entries.get(&path).ok_or_else(not_found)?;
        if !path.is_empty() {
            check_access(&entries, who, parent_of(&path), 'r')?;
        }
        Ok(info_of(entry))
    }

    async fn get(&self, who: &Credential, path: &str) -> RemoteResult<Vec<u8>> {
        let path = normalize(path);
        self.record("get", who, &path);
        let entries = self.read_entries()?;
        match entries.get(&path) {
            Some(MemoryEntry::File(data)) => {
                check_access(&entries, who, parent_of(&path), 'r')?;
                Ok(data.clone())
            }
            Some(MemoryEntry::Directory(_)) => {
                Err(RemoteError::from_status_text("405 Is a directory"))
            }
            None => Err(not_found()),
        }
    }

    async fn put(&self, who: &Credential, path: &str, data: &[u8]) -> RemoteResult<()> {
        let path = normalize(path);
        self.record("put", who, &path);
        let mut entries = self.write_entries()?;
        check_access(&entries, who, parent_of(&path), 'w')?;
        if matches!(entries.get(&path), Some(MemoryEntry::Directory(_))) {
            return Err(RemoteError::from_status_text("405 Is a directory"));
        }
        entries.insert(path, MemoryEntry::File(data.to_vec()));
        Ok(())
    }

    async fn create_directory(&self, who: &Credential, path: &str) -> RemoteResult<()> {
        let path = normalize(path);
        self.record("mkdir", who, &path);
        let mut entries = self.write_entries()?;
        check_access(&entries, who, parent_of(&path), 'w')?;
        if entries.contains_key(&path) {
            return Err(RemoteError::from_status_text("409 Already exists"));
        }
        let owner = match who {
            Credential::Admin => None,
            Credential::User(user) => Some(user.clone()),
        };
        entries.insert(
            path,
            MemoryEntry::Directory(DirectoryAcl {
                owner,
                access: HashMap::new(),
            }),
        );
        Ok(())
    }

    async fn set_permissions(
        &self,
        who: &Credential,
        dir: &str,
        user: &str,
        access: &str,
    ) -> RemoteResult<()> {
        let dir = normalize(dir);
        self.record("setperm", who, &dir);
        let mut entries = self.write_entries()?;
        match entries.get_mut(&dir) {
            Some(MemoryEntry::Directory(acl)) => {
                let allowed = match who {
                    Credential::Admin => true,
                    Credential::User(u) => acl.owner.as_deref() == Some(u.as_str()),
                };
                if !allowed {
                    return Err(denied());
                }
                if access.is_empty() {
                    acl.access.remove(user);
                } else {
                    acl.access.insert(user.to_string(), access.to_string());
                }
                Ok(())
            }
            Some(MemoryEntry::File(_)) => Err(RemoteError::from_status_text("405 Not a directory")),
            None => Err(not_found()),
        }
    }
}
