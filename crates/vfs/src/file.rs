use async_trait::async_trait;
use game_host_protocol::Credential;
use tracing::debug;

use crate::error::ItemResult;
use crate::item::{Info, Item};
use crate::session::Session;

/// Leaf backed by one remote file
///
/// Metadata is known at construction, so `info` never goes to the network.
/// `content` reads the file under the credential the item was created for.
#[derive(Debug, Clone)]
pub struct FileItem {
    name: String,
    path: String,
    size: Option<u64>,
    owner: Credential,
}

impl FileItem {
    pub const fn new(name: String, path: String, size: Option<u64>, owner: Credential) -> Self {
        Self {
            name,
            path,
            size,
            owner,
        }
    }

    /// Remote path of the file
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl Item for FileItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::file(&self.name, self.size))
    }

    async fn content(&self, session: &Session) -> ItemResult<Vec<u8>> {
        debug!(path = %self.path, user = %self.owner, "read file");
        Ok(session.files().get(&self.owner, &self.path).await?)
    }
}
