//! Caller identity and the services behind the namespace

use std::sync::Arc;

use game_host_protocol::{Credential, FileService};

use crate::store::GameStore;

/// Namespace tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// First turn for which backups are published under `history/`
    pub history_start_turn: u32,
    /// Maximum number of path segments / tree levels
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            history_start_turn: 10,
            max_depth: 16,
        }
    }
}

/// Backing services shared by all sessions
pub struct ServiceRoot {
    files: Arc<dyn FileService>,
    games: Arc<dyn GameStore>,
    options: Options,
}

impl ServiceRoot {
    pub fn new(files: Arc<dyn FileService>, games: Arc<dyn GameStore>) -> Self {
        Self {
            files,
            games,
            options: Options::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn files(&self) -> &dyn FileService {
        self.files.as_ref()
    }

    /// Owned handle on the file service, for objects that outlive a call
    pub fn shared_files(&self) -> Arc<dyn FileService> {
        Arc::clone(&self.files)
    }

    pub fn games(&self) -> &dyn GameStore {
        self.games.as_ref()
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }
}

/// Identity under which one traversal is evaluated
#[derive(Clone)]
pub struct Session {
    user: Credential,
    root: Arc<ServiceRoot>,
}

impl Session {
    pub const fn new(root: Arc<ServiceRoot>, user: Credential) -> Self {
        Self { user, root }
    }

    pub const fn admin(root: Arc<ServiceRoot>) -> Self {
        Self::new(root, Credential::Admin)
    }

    pub const fn user(&self) -> &Credential {
        &self.user
    }

    pub fn root(&self) -> &ServiceRoot {
        &self.root
    }

    pub fn files(&self) -> &dyn FileService {
        self.root.files()
    }

    pub fn games(&self) -> &dyn GameStore {
        self.root.games()
    }

    pub fn options(&self) -> &Options {
        self.root.options()
    }
}
