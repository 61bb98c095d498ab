use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{join_path, ContentInfoMap, Credential, FileInfo, FileService};
use tracing::debug;

use super::{title_of, DirResult, Directory, DirectoryEntry, FileProblem, FileStream};

/// Suffix of partial override files
const FRAGMENT_SUFFIX: &str = ".frag";

struct SpecState {
    files: Arc<dyn FileService>,
    who: Credential,
    path: String,
    title: String,
    listing: ContentInfoMap,
    enabled: AtomicBool,
}

/// Directory of specification files, read for one publishing job
///
/// The listing is fetched once, up front. A name that is absent but has a
/// `.frag` variant resolves to the fragment. There are no subdirectories
/// and no mutation. After [`SpecDirectory::disable`], every open fails, so
/// a reference kept past the job cannot read anything.
#[derive(Clone)]
pub struct SpecDirectory {
    state: Arc<SpecState>,
}

impl SpecDirectory {
    /// List `path` and create the directory
    pub async fn open(files: Arc<dyn FileService>, who: Credential, path: &str) -> DirResult<Self> {
        let listing = files
            .list(&who, path)
            .await
            .map_err(|e| FileProblem::from_remote(path, &e))?;
        debug!(path, entries = listing.len(), "open specification directory");
        Ok(Self {
            state: Arc::new(SpecState {
                files,
                who,
                path: path.to_string(),
                title: title_of(path).to_string(),
                listing,
                enabled: AtomicBool::new(true),
            }),
        })
    }

    /// Remote path of this directory
    pub fn path(&self) -> &str {
        &self.state.path
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::SeqCst)
    }

    fn file_info(&self, name: &str) -> Option<FileInfo> {
        self.state
            .listing
            .get(name)
            .copied()
            .filter(|info| info.file_type.is_file())
    }

    /// Entry for `name`, falling back to `name.frag`
    fn lookup(&self, name: &str) -> Option<SpecEntry> {
        let (source, info) = match self.file_info(name) {
            Some(info) => (name.to_string(), info),
            None => {
                let fragment = format!("{name}{FRAGMENT_SUFFIX}");
                let info = self.file_info(&fragment)?;
                (fragment, info)
            }
        };
        Some(SpecEntry {
            state: Arc::clone(&self.state),
            title: name.to_string(),
            source,
            info,
        })
    }
}

#[async_trait]
impl Directory for SpecDirectory {
    fn title(&self) -> &str {
        &self.state.title
    }

    fn parent(&self) -> Option<Arc<dyn Directory>> {
        None
    }

    async fn entry(&self, name: &str) -> DirResult<Arc<dyn DirectoryEntry>> {
        let path = join_path(&self.state.path, name);
        self.lookup(name)
            .map(|entry| Arc::new(entry) as Arc<dyn DirectoryEntry>)
            .ok_or_else(|| FileProblem::missing(&path))
    }

    async fn entries(&self) -> DirResult<Vec<Arc<dyn DirectoryEntry>>> {
        Ok(self
            .state
            .listing
            .keys()
            .filter_map(|name| self.lookup(name))
            .map(|entry| Arc::new(entry) as Arc<dyn DirectoryEntry>)
            .collect())
    }
}

/// File of a [`SpecDirectory`]
///
/// `title` is the requested name, `source` the file actually read (which
/// differs for a fragment).
struct SpecEntry {
    state: Arc<SpecState>,
    title: String,
    source: String,
    info: FileInfo,
}

#[async_trait]
impl DirectoryEntry for SpecEntry {
    fn title(&self) -> &str {
        &self.title
    }

    async fn info(&self) -> DirResult<FileInfo> {
        Ok(self.info)
    }

    async fn open_for_reading(&self) -> DirResult<FileStream> {
        let path = join_path(&self.state.path, &self.source);
        if !self.state.enabled.load(Ordering::SeqCst) {
            return Err(FileProblem::other(&path, "directory has been disabled"));
        }
        let data = self
            .state
            .files
            .get(&self.state.who, &path)
            .await
            .map_err(|e| FileProblem::from_remote(&path, &e))?;
        Ok(Cursor::new(data))
    }

    async fn open_directory(&self) -> DirResult<Arc<dyn Directory>> {
        Err(FileProblem::other(
            &join_path(&self.state.path, &self.title),
            "subdirectories are not supported",
        ))
    }
}
