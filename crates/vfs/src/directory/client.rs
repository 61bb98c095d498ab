use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{join_path, Credential, FileInfo, FileService};
use tokio::sync::OnceCell;
use tracing::debug;

use super::{title_of, DirResult, Directory, DirectoryEntry, FileProblem, FileStream};

/// Read-only [`Directory`] over one remote directory
///
/// Every remote call runs under the credential given at construction.
#[derive(Clone)]
pub struct ClientDirectory {
    files: Arc<dyn FileService>,
    who: Credential,
    path: String,
    title: String,
    parent: Option<Arc<ClientDirectory>>,
}

impl ClientDirectory {
    pub fn new(files: Arc<dyn FileService>, who: Credential, path: &str) -> Self {
        let title = title_of(path).to_string();
        Self {
            files,
            who,
            path: path.to_string(),
            title,
            parent: None,
        }
    }

    /// Remote path of this directory
    pub fn path(&self) -> &str {
        &self.path
    }

    fn make_entry(&self, name: &str, info: Option<FileInfo>) -> ClientEntry {
        ClientEntry {
            dir: Arc::new(self.clone()),
            name: name.to_string(),
            path: join_path(&self.path, name),
            info: OnceCell::new_with(info),
        }
    }
}

#[async_trait]
impl Directory for ClientDirectory {
    fn title(&self) -> &str {
        &self.title
    }

    fn parent(&self) -> Option<Arc<dyn Directory>> {
        self.parent
            .as_ref()
            .map(|p| Arc::clone(p) as Arc<dyn Directory>)
    }

    async fn entry(&self, name: &str) -> DirResult<Arc<dyn DirectoryEntry>> {
        Ok(Arc::new(self.make_entry(name, None)))
    }

    async fn entries(&self) -> DirResult<Vec<Arc<dyn DirectoryEntry>>> {
        let listing = self
            .files
            .list(&self.who, &self.path)
            .await
            .map_err(|e| FileProblem::from_remote(&self.path, &e))?;
        Ok(listing
            .into_iter()
            .map(|(name, info)| Arc::new(self.make_entry(&name, Some(info))) as Arc<dyn DirectoryEntry>)
            .collect())
    }
}

/// Entry of a [`ClientDirectory`]; metadata is fetched at most once
pub struct ClientEntry {
    dir: Arc<ClientDirectory>,
    name: String,
    path: String,
    info: OnceCell<FileInfo>,
}

#[async_trait]
impl DirectoryEntry for ClientEntry {
    fn title(&self) -> &str {
        &self.name
    }

    async fn info(&self) -> DirResult<FileInfo> {
        let info = self
            .info
            .get_or_try_init(|| async {
                debug!(path = %self.path, "stat entry");
                self.dir
                    .files
                    .stat(&self.dir.who, &self.path)
                    .await
                    .map_err(|e| FileProblem::from_remote(&self.path, &e))
            })
            .await?;
        Ok(*info)
    }

    async fn open_for_reading(&self) -> DirResult<FileStream> {
        let data = self
            .dir
            .files
            .get(&self.dir.who, &self.path)
            .await
            .map_err(|e| FileProblem::from_remote(&self.path, &e))?;
        Ok(Cursor::new(data))
    }

    async fn open_directory(&self) -> DirResult<Arc<dyn Directory>> {
        Ok(Arc::new(ClientDirectory {
            files: Arc::clone(&self.dir.files),
            who: self.dir.who.clone(),
            path: self.path.clone(),
            title: self.name.clone(),
            parent: Some(Arc::clone(&self.dir)),
        }))
    }
}
