//! Remote file service contract for game-host
//!
//! Defines the calls the host makes against the protocol-only file store,
//! the metadata it gets back, and the typed errors produced at the
//! transport boundary.

pub mod connection;
pub mod error;
pub mod memory;
pub mod service;
pub mod types;

pub use connection::{SerializedClient, StatefulClient};
pub use error::{RemoteError, RemoteResult};
pub use memory::{MemoryFileService, RemoteCall};
pub use service::{join_path, FileService};
pub use types::{ContentInfoMap, Credential, FileInfo, FileType};
