//! Namespace nodes and path resolution
//!
//! Every node of the virtual tree implements [`Item`]. Nodes are built on
//! demand by their parent's `find`/`list_content` and dropped at the end of
//! the request; none of them caches remote state beyond its own lifetime.

use async_trait::async_trait;
use game_host_protocol::{join_path, Credential, FileType, RemoteError};
use serde::Serialize;
use tracing::debug;

use crate::error::{ItemError, ItemResult};
use crate::file::FileItem;
use crate::session::Session;

/// Grouping label reported with an item's metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    #[default]
    None,
    Game,
    Tool,
    History,
}

/// Item metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    pub name: String,
    pub kind: FileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub label: Label,
}

impl Info {
    fn new(name: &str, kind: FileType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            size: None,
            game_id: None,
            game_name: None,
            tool_name: None,
            label: Label::None,
        }
    }

    pub fn file(name: &str, size: Option<u64>) -> Self {
        Self {
            size,
            ..Self::new(name, FileType::File)
        }
    }

    pub fn directory(name: &str) -> Self {
        Self::new(name, FileType::Directory)
    }

    /// A node that can be navigated but not listed
    pub fn unknown(name: &str) -> Self {
        Self::new(name, FileType::Unknown)
    }

    #[must_use]
    pub const fn with_label(mut self, label: Label) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn with_game(mut self, id: u32, name: &str) -> Self {
        self.game_id = Some(id);
        self.game_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_tool(mut self, name: &str) -> Self {
        self.tool_name = Some(name.to_string());
        self
    }
}

/// Children produced by one listing
pub type ItemVector = Vec<Box<dyn Item>>;

/// A node of the virtual tree
///
/// Directories implement `list_content` (and usually `find` through
/// [`default_find`]); files implement `content`. The defaults reject the
/// operation, so a File can never be listed and a Directory never read.
#[async_trait]
pub trait Item: Send + Sync {
    /// Name of this node within its parent
    fn name(&self) -> &str;

    /// Metadata
    async fn info(&self, session: &Session) -> ItemResult<Info>;

    /// Look up one child
    ///
    /// `Ok(None)` means "no such child".
    async fn find(&self, _session: &Session, _name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        Ok(None)
    }

    /// List all children
    async fn list_content(&self, _session: &Session) -> ItemResult<ItemVector> {
        Err(ItemError::invalid_operation(format!(
            "{} cannot be listed",
            self.name()
        )))
    }

    /// Read file content
    async fn content(&self, _session: &Session) -> ItemResult<Vec<u8>> {
        Err(ItemError::invalid_operation(format!(
            "{} cannot be read",
            self.name()
        )))
    }
}

/// `find` for directories without special-cased children: list once, pick by name
pub async fn default_find(
    item: &dyn Item,
    session: &Session,
    name: &str,
) -> ItemResult<Option<Box<dyn Item>>> {
    let children = item.list_content(session).await?;
    Ok(children.into_iter().find(|child| child.name() == name))
}

/// Wrap every regular file of one remote directory listing
///
/// The remote calls (and the resulting items' reads) run under `owner`.
pub async fn list_remote_files(
    session: &Session,
    owner: &Credential,
    dir: &str,
) -> ItemResult<ItemVector> {
    let listing = session.files().list(owner, dir).await?;
    Ok(listing
        .into_iter()
        .filter(|(_, info)| info.file_type.is_file())
        .map(|(name, info)| {
            let path = join_path(dir, &name);
            Box::new(FileItem::new(name, path, info.size, owner.clone())) as Box<dyn Item>
        })
        .collect())
}

/// Map a metadata lookup to "absent" on 404
pub(crate) fn optional<T>(result: Result<T, RemoteError>) -> ItemResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RemoteError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Parse a number the way the namespace prints it: plain decimal, no
/// sign, no leading zero, not zero
pub(crate) fn parse_canonical_number(text: &str) -> Option<u32> {
    if text.is_empty() || text.starts_with('0') || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Split a path into segments
///
/// Rejects the empty path, a leading or trailing slash, empty segments and
/// paths with more than `max_depth` segments.
pub fn split_path(path: &str, max_depth: usize) -> ItemResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ItemError::not_found(format!("malformed path '{path}'")));
    }
    if segments.len() > max_depth {
        return Err(ItemError::not_found(format!("path '{path}' is too deep")));
    }
    Ok(segments)
}

/// Resolve a slash-separated path starting at `start`
///
/// Every node visited (not including `start`) is appended to `trace`; the
/// returned node is the last one appended.
pub async fn resolve_path<'t>(
    start: &dyn Item,
    session: &Session,
    path: &str,
    trace: &'t mut ItemVector,
) -> ItemResult<&'t dyn Item> {
    let segments = split_path(path, session.options().max_depth)?;
    let first = trace.len();

    for segment in segments {
        let next = {
            let current: &dyn Item = match trace.last() {
                Some(item) if trace.len() > first => item.as_ref(),
                _ => start,
            };
            if trace.len() > first && current.info(session).await?.kind.is_file() {
                return Err(ItemError::not_found(format!(
                    "'{path}': {} is a file",
                    current.name()
                )));
            }
            debug!(parent = current.name(), segment, "resolve");
            current
                .find(session, segment)
                .await?
                .ok_or_else(|| ItemError::not_found(format!("'{path}': no '{segment}'")))?
        };
        trace.push(next);
    }

    trace
        .last()
        .map(AsRef::as_ref)
        .ok_or_else(|| ItemError::not_found(format!("'{path}'")))
}
