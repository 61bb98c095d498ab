//! Virtual game file namespace
//!
//! Presents games, their per-turn history and tool directories as one
//! read-only tree of [`Item`]s, assembled on demand from a remote
//! [`FileService`](game_host_protocol::FileService) and a [`GameStore`].
//!
//! ```text
//! game/<id>/                 GameItem
//!     <file>                 current files for all players
//!     <slot>/                GameSlotItem: player<slot>.rst, player<slot>.trn
//!     history/<turn>/        HistoryTurnItem: specification files
//!         <slot>/            HistorySlotItem
//! tool/<id>/                 ToolItem
//! shiplist/<id>/             ToolItem
//! ```

pub mod directory;
pub mod error;
pub mod file;
pub mod game;
pub mod guard;
pub mod history;
pub mod item;
pub mod publish;
pub mod root;
pub mod session;
pub mod slot;
pub mod store;
pub mod tool;
pub mod walk;

pub use directory::{ClientDirectory, Directory, DirectoryEntry, FileProblem, SpecDirectory};
pub use error::{ItemError, ItemResult};
pub use file::FileItem;
pub use game::GameItem;
pub use history::{HistoryItem, HistorySlotItem, HistoryTurnItem};
pub use item::{default_find, list_remote_files, resolve_path, split_path, Info, Item, ItemVector, Label};
pub use publish::load_specification;
pub use root::{GameRootItem, RootItem};
pub use session::{Options, ServiceRoot, Session};
pub use slot::GameSlotItem;
pub use store::{
    ExistenceCheck, GameLock, GameRecord, GameSnapshot, GameStore, MemoryGameStore, SlotEvent,
    SlotHistory, SlotRecord, StoreError, StoreResult, StoreSnapshot, ToolKind, ToolRecord,
    TurnRecord,
};
pub use tool::{Restriction, ToolItem, ToolRootItem};
pub use walk::{walk_tree, TreeNode};
