//! Game, turn and tool records
//!
//! The record store is owned by the rest of the hosting service; this
//! module only describes what the namespace reads from it. [`GameStore`] is
//! the contract, [`MemoryGameStore`] an implementation over a loaded
//! snapshot that the standalone host and the tests use.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock as StdRwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

use crate::error::ItemError;

/// Record store error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no such record: {0}")]
    NotFound(String),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ItemError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Unavailable(msg) => Self::Remote(msg),
        }
    }
}

/// Whether [`GameStore::game`] should verify that the game exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceCheck {
    Check,
    /// Existence was already verified, e.g. by holding a [`GameLock`]
    Skip,
}

/// Read guard on one game
///
/// Obtaining it proves the game existed; while it is held, the game record
/// is not replaced.
pub struct GameLock {
    game_id: u32,
    _guard: Option<OwnedRwLockReadGuard<()>>,
}

impl GameLock {
    pub const fn new(game_id: u32, guard: Option<OwnedRwLockReadGuard<()>>) -> Self {
        Self {
            game_id,
            _guard: guard,
        }
    }

    pub const fn game_id(&self) -> u32 {
        self.game_id
    }
}

/// One change of a slot's occupancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SlotEvent {
    /// `user` takes over the slot, on top of whoever held it
    Push { turn: u32, user: String },
    /// The current occupant leaves; the previous one (if any) returns
    Pop { turn: u32 },
}

impl SlotEvent {
    pub const fn turn(&self) -> u32 {
        match self {
            Self::Push { turn, .. } | Self::Pop { turn } => *turn,
        }
    }
}

/// Ordered push/pop history of one slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotHistory {
    events: Vec<SlotEvent>,
}

impl SlotHistory {
    pub const fn new(events: Vec<SlotEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[SlotEvent] {
        &self.events
    }

    /// Occupant at the given turn
    pub fn occupant_at(&self, turn: u32) -> Option<&str> {
        replay(self.events.iter().filter(|e| e.turn() <= turn))
    }

    /// Occupant after all events
    pub fn current(&self) -> Option<&str> {
        replay(self.events.iter())
    }

    /// True if `user` was the occupant at any point
    pub fn has_occupied(&self, user: &str) -> bool {
        let mut stack: Vec<&str> = Vec::new();
        for event in &self.events {
            apply(&mut stack, event);
            if stack.last() == Some(&user) {
                return true;
            }
        }
        false
    }
}

fn apply<'a>(stack: &mut Vec<&'a str>, event: &'a SlotEvent) {
    match event {
        SlotEvent::Push { user, .. } => stack.push(user),
        SlotEvent::Pop { .. } => {
            stack.pop();
        }
    }
}

fn replay<'a>(events: impl Iterator<Item = &'a SlotEvent>) -> Option<&'a str> {
    let mut stack = Vec::new();
    for event in events {
        apply(&mut stack, event);
    }
    stack.last().copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub number: u32,
    #[serde(default)]
    pub history: SlotHistory,
}

/// Game metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub name: String,
    /// Game directory on the file service
    pub directory: String,
    /// Current turn number
    pub turn: u32,
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
}

/// A backup recorded for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    /// Whether the specification files were saved with this backup
    #[serde(default)]
    pub has_specification: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Tool,
    ShipList,
}

impl ToolKind {
    /// Path segment naming this kind in the namespace
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::ShipList => "shiplist",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "tool" => Some(Self::Tool),
            "shiplist" => Some(Self::ShipList),
            _ => None,
        }
    }
}

/// A tool or ship list mounted from the file service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub kind: ToolKind,
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Directory on the file service
    pub path: String,
    /// Comma-separated list of published file names; absent means all
    #[serde(default)]
    pub files: Option<String>,
}

/// Read access to game, turn and tool records
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Acquire a read guard on a game, failing if it does not exist
    async fn lock_game(&self, game_id: u32) -> StoreResult<GameLock>;

    /// Load a game record
    async fn game(&self, lock: &GameLock, check: ExistenceCheck) -> StoreResult<GameRecord>;

    /// Look up the backup record of one turn
    async fn turn(&self, game_id: u32, turn: u32) -> StoreResult<Option<TurnRecord>>;

    /// All recorded turns of a game, ascending
    async fn turns(&self, game_id: u32) -> StoreResult<Vec<TurnRecord>>;

    /// All tools of a kind, ordered by id
    async fn tools(&self, kind: ToolKind) -> StoreResult<Vec<ToolRecord>>;

    async fn tool(&self, kind: ToolKind, id: &str) -> StoreResult<ToolRecord>;
}

/// A game with its turn records, as stored in a snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(flatten)]
    pub game: GameRecord,
    #[serde(default)]
    pub turns: Vec<TurnRecord>,
}

/// Complete record store content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub games: Vec<GameSnapshot>,
    #[serde(default)]
    pub tools: Vec<ToolRecord>,
}

struct StoredGame {
    lock: Arc<RwLock<()>>,
    game: GameRecord,
    turns: BTreeMap<u32, TurnRecord>,
}

/// In-memory record store
///
/// Each game has its own async `RwLock`; [`MemoryGameStore::insert_game`]
/// takes the write side so a record is never replaced under a reader.
#[derive(Default)]
pub struct MemoryGameStore {
    games: StdRwLock<BTreeMap<u32, StoredGame>>,
    tools: StdRwLock<Vec<ToolRecord>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let games = snapshot
            .games
            .into_iter()
            .map(|g| (g.game.id, stored(Arc::new(RwLock::new(())), g)))
            .collect();
        Self {
            games: StdRwLock::new(games),
            tools: StdRwLock::new(snapshot.tools),
        }
    }

    /// Add or replace a game
    pub async fn insert_game(&self, snapshot: GameSnapshot) -> StoreResult<()> {
        let id = snapshot.game.id;
        let lock = self
            .read_games()?
            .get(&id)
            .map_or_else(|| Arc::new(RwLock::new(())), |g| Arc::clone(&g.lock));

        let _writer = lock.write().await;
        self.write_games()?.insert(id, stored(Arc::clone(&lock), snapshot));
        Ok(())
    }

    pub fn insert_tool(&self, tool: ToolRecord) -> StoreResult<()> {
        let mut tools = self
            .tools
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        tools.retain(|t| !(t.kind == tool.kind && t.id == tool.id));
        tools.push(tool);
        Ok(())
    }

    fn read_games(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<u32, StoredGame>>> {
        self.games
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write_games(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<u32, StoredGame>>> {
        self.games
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn read_tools(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Vec<ToolRecord>>> {
        self.tools
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }
}

fn stored(lock: Arc<RwLock<()>>, snapshot: GameSnapshot) -> StoredGame {
    StoredGame {
        lock,
        game: snapshot.game,
        turns: snapshot.turns.into_iter().map(|t| (t.turn, t)).collect(),
    }
}

fn no_game(game_id: u32) -> StoreError {
    StoreError::NotFound(format!("game {game_id}"))
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn lock_game(&self, game_id: u32) -> StoreResult<GameLock> {
        let lock = self
            .read_games()?
            .get(&game_id)
            .map(|g| Arc::clone(&g.lock))
            .ok_or_else(|| no_game(game_id))?;
        Ok(GameLock::new(game_id, Some(lock.read_owned().await)))
    }

    async fn game(&self, lock: &GameLock, _check: ExistenceCheck) -> StoreResult<GameRecord> {
        // Both modes answer from the same map, so Check costs nothing extra.
        self.read_games()?
            .get(&lock.game_id())
            .map(|g| g.game.clone())
            .ok_or_else(|| no_game(lock.game_id()))
    }

    async fn turn(&self, game_id: u32, turn: u32) -> StoreResult<Option<TurnRecord>> {
        let games = self.read_games()?;
        let game = games.get(&game_id).ok_or_else(|| no_game(game_id))?;
        Ok(game.turns.get(&turn).copied())
    }

    async fn turns(&self, game_id: u32) -> StoreResult<Vec<TurnRecord>> {
        let games = self.read_games()?;
        let game = games.get(&game_id).ok_or_else(|| no_game(game_id))?;
        Ok(game.turns.values().copied().collect())
    }

    async fn tools(&self, kind: ToolKind) -> StoreResult<Vec<ToolRecord>> {
        let mut tools: Vec<ToolRecord> = self
            .read_tools()?
            .iter()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tools)
    }

    async fn tool(&self, kind: ToolKind, id: &str) -> StoreResult<ToolRecord> {
        self.read_tools()?
            .iter()
            .find(|t| t.kind == kind && t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} {id}", kind.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(turn: u32, user: &str) -> SlotEvent {
        SlotEvent::Push {
            turn,
            user: user.into(),
        }
    }

    #[test]
    fn test_slot_history_replacement() {
        let history = SlotHistory::new(vec![push(1, "b"), SlotEvent::Pop { turn: 20 }, push(20, "c")]);
        assert_eq!(history.occupant_at(19), Some("b"));
        assert_eq!(history.occupant_at(20), Some("c"));
        assert_eq!(history.current(), Some("c"));
        assert!(history.has_occupied("b"));
        assert!(history.has_occupied("c"));
        assert!(!history.has_occupied("a"));
    }

    #[test]
    fn test_slot_history_stack() {
        // replacement player on top of the original, who later returns
        let history = SlotHistory::new(vec![push(1, "x"), push(5, "y"), SlotEvent::Pop { turn: 8 }]);
        assert_eq!(history.occupant_at(0), None);
        assert_eq!(history.occupant_at(6), Some("y"));
        assert_eq!(history.occupant_at(8), Some("x"));

        let left = SlotHistory::new(vec![push(1, "f"), SlotEvent::Pop { turn: 25 }]);
        assert_eq!(left.occupant_at(24), Some("f"));
        assert_eq!(left.occupant_at(25), None);
        assert_eq!(left.current(), None);
        assert!(left.has_occupied("f"));

        // pushed and popped in the same turn: never visible at a turn, but occupied
        let flash = SlotHistory::new(vec![push(3, "z"), SlotEvent::Pop { turn: 3 }]);
        assert_eq!(flash.occupant_at(3), None);
        assert!(flash.has_occupied("z"));
    }

    #[test]
    fn test_snapshot_json() {
        let json = r#"{
            "games": [{
                "id": 7, "name": "Seven", "directory": "games/0007", "turn": 12,
                "slots": [{"number": 1, "history": [
                    {"action": "push", "turn": 1, "user": "a"},
                    {"action": "pop", "turn": 4}
                ]}],
                "turns": [{"turn": 11, "has_specification": true}]
            }],
            "tools": [{"kind": "shiplist", "id": "pList", "path": "shiplists/plist"}]
        }"#;
        let snapshot: StoreSnapshot = serde_json::from_str(json).unwrap();
        let game = &snapshot.games[0];
        assert_eq!(game.game.directory, "games/0007");
        assert_eq!(game.game.slots[0].history.events()[1], SlotEvent::Pop { turn: 4 });
        assert!(game.turns[0].has_specification);
        assert_eq!(snapshot.tools[0].kind, ToolKind::ShipList);
        assert_eq!(snapshot.tools[0].files, None);
    }

    fn sample_store() -> MemoryGameStore {
        MemoryGameStore::from_snapshot(StoreSnapshot {
            games: vec![GameSnapshot {
                game: GameRecord {
                    id: 3,
                    name: "Three".into(),
                    directory: "games/3".into(),
                    turn: 5,
                    slots: Vec::new(),
                },
                turns: vec![TurnRecord {
                    turn: 5,
                    has_specification: false,
                }],
            }],
            tools: vec![
                ToolRecord {
                    kind: ToolKind::Tool,
                    id: "b".into(),
                    description: String::new(),
                    path: "tools/b".into(),
                    files: None,
                },
                ToolRecord {
                    kind: ToolKind::Tool,
                    id: "a".into(),
                    description: String::new(),
                    path: "tools/a".into(),
                    files: None,
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_memory_store_lookups() {
        let store = sample_store();

        let lock = store.lock_game(3).await.unwrap();
        let game = store.game(&lock, ExistenceCheck::Skip).await.unwrap();
        assert_eq!(game.name, "Three");
        assert!(store.turn(3, 5).await.unwrap().is_some());
        assert!(store.turn(3, 4).await.unwrap().is_none());
        assert!(matches!(store.lock_game(4).await, Err(StoreError::NotFound(_))));

        let ids: Vec<String> = store
            .tools(ToolKind::Tool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.tools(ToolKind::ShipList).await.unwrap().is_empty());
        assert!(store.tool(ToolKind::ShipList, "a").await.is_err());
    }

    #[tokio::test]
    async fn test_insert_waits_for_readers() {
        let store = Arc::new(sample_store());
        let lock = store.lock_game(3).await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut snapshot = GameSnapshot {
                    game: store
                        .game(&store.lock_game(3).await.unwrap(), ExistenceCheck::Check)
                        .await
                        .unwrap(),
                    turns: Vec::new(),
                };
                snapshot.game.turn = 6;
                store.insert_game(snapshot).await.unwrap();
            })
        };

        tokio::task::yield_now().await;
        // still the old record while our guard is held
        assert_eq!(store.game(&lock, ExistenceCheck::Skip).await.unwrap().turn, 5);
        drop(lock);

        writer.await.unwrap();
        let lock = store.lock_game(3).await.unwrap();
        assert_eq!(store.game(&lock, ExistenceCheck::Skip).await.unwrap().turn, 6);
    }
}
