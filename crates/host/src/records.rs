//! Game and tool records loaded from a JSON snapshot

use std::path::Path;

use anyhow::{Context, Result};
use game_host_vfs::{MemoryGameStore, StoreSnapshot};
use tracing::{info, warn};

/// Load the record store; a missing file gives an empty store
pub fn load_store(path: &Path) -> Result<MemoryGameStore> {
    if !path.exists() {
        warn!(path = %path.display(), "no record file, starting with an empty store");
        return Ok(MemoryGameStore::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot = parse_snapshot(&content)
        .with_context(|| format!("Invalid record file {}", path.display()))?;
    info!(
        games = snapshot.games.len(),
        tools = snapshot.tools.len(),
        "loaded records"
    );
    Ok(MemoryGameStore::from_snapshot(snapshot))
}

fn parse_snapshot(content: &str) -> serde_json::Result<StoreSnapshot> {
    serde_json::from_str(content)
}
