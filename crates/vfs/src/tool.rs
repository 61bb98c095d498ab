//! `tool/` and `shiplist/` mounts
//!
//! Tool files are read under the session's own credential, so the file
//! service's permissions apply on top of the publication restriction.

use async_trait::async_trait;
use game_host_protocol::join_path;
use tracing::debug;

use crate::error::ItemResult;
use crate::file::FileItem;
use crate::item::{default_find, list_remote_files, optional, Info, Item, ItemVector, Label};
use crate::session::Session;
use crate::store::{StoreError, ToolKind, ToolRecord};

/// Which files of a tool directory are published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    All,
    /// Only these names; empty publishes nothing
    Names(Vec<String>),
}

impl Restriction {
    /// Parse a comma-separated restriction list
    pub fn parse(files: Option<&str>) -> Self {
        files.map_or(Self::All, |list| {
            Self::Names(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        })
    }

    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

/// All tools of one kind
pub struct ToolRootItem {
    kind: ToolKind,
}

impl ToolRootItem {
    pub const fn new(kind: ToolKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Item for ToolRootItem {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(self.name()))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        match session.games().tool(self.kind, name).await {
            Ok(record) => Ok(Some(Box::new(ToolItem::new(record)))),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        Ok(session
            .games()
            .tools(self.kind)
            .await?
            .into_iter()
            .map(|record| Box::new(ToolItem::new(record)) as Box<dyn Item>)
            .collect())
    }
}

/// One tool or ship list directory
pub struct ToolItem {
    record: ToolRecord,
    restriction: Restriction,
}

impl ToolItem {
    pub fn new(record: ToolRecord) -> Self {
        let restriction = Restriction::parse(record.files.as_deref());
        Self {
            record,
            restriction,
        }
    }
}

#[async_trait]
impl Item for ToolItem {
    fn name(&self) -> &str {
        &self.record.id
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(&self.record.id)
            .with_tool(&self.record.description)
            .with_label(Label::Tool))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        default_find(self, session, name).await
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        let who = session.user();
        let dir = &self.record.path;
        debug!(tool = %self.record.id, user = %who, "list tool");

        match &self.restriction {
            Restriction::All => list_remote_files(session, who, dir).await,
            Restriction::Names(names) => match names.as_slice() {
                [] => Ok(ItemVector::new()),
                // A single file needs only its metadata. Unlike a listing,
                // this turns a missing file into an empty result.
                [name] => {
                    let path = join_path(dir, name);
                    let info = optional(session.files().stat(who, &path).await)?;
                    Ok(info
                        .filter(|i| i.file_type.is_file())
                        .map(|i| {
                            Box::new(FileItem::new(name.clone(), path, i.size, who.clone()))
                                as Box<dyn Item>
                        })
                        .into_iter()
                        .collect())
                }
                _ => {
                    let files = list_remote_files(session, who, dir).await?;
                    Ok(files
                        .into_iter()
                        .filter(|f| self.restriction.allows(f.name()))
                        .collect())
                }
            },
        }
    }
}
