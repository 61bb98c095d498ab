//! Shared fixture: one 30-turn game with five slots
//!
//! - slot 1: "a" for the whole game
//! - slot 2: "b", replaced by "c" at turn 20
//! - slots 3 and 4: "d" and "e" for the whole game
//! - slot 5: "f", left at turn 25 (no current files)
//!
//! Every turn has a backup with six specification files plus the
//! result and turn files of the slots occupied at that turn.
#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Arc;

use game_host_protocol::{Credential, MemoryFileService};
use game_host_vfs::{
    resolve_path, GameRecord, GameSnapshot, Item, ItemResult, ItemVector, MemoryGameStore,
    RootItem, ServiceRoot, Session, SlotEvent, SlotHistory, SlotRecord, StoreSnapshot,
    ToolRecord, TurnRecord,
};

pub const GAME_ID: u32 = 1;
pub const LAST_TURN: u32 = 30;
pub const SHARED_FILES: [&str; 3] = ["beamspec.dat", "planet.nm", "race.nm"];
pub const SPEC_FILES: [&str; 6] = [
    "beamspec.dat",
    "engspec.dat",
    "hullspec.dat",
    "pconfig.src",
    "planet.nm",
    "torpspec.dat",
];

pub struct Fixture {
    pub files: Arc<MemoryFileService>,
    pub store: Arc<MemoryGameStore>,
    pub root: Arc<ServiceRoot>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(Vec::new(), Vec::new())
    }

    /// The standard game plus additional games and tools
    pub fn with(games: Vec<GameSnapshot>, tools: Vec<ToolRecord>) -> Self {
        let files = Arc::new(MemoryFileService::new());
        let game = standard_game();
        populate(&files, &game.game);

        let mut snapshot = StoreSnapshot {
            games: vec![game],
            tools,
        };
        snapshot.games.extend(games);
        let store = Arc::new(MemoryGameStore::from_snapshot(snapshot));
        let root = Arc::new(ServiceRoot::new(files.clone(), store.clone()));
        Self { files, store, root }
    }

    /// Session for a user id ("" = admin)
    pub fn session(&self, user: &str) -> Session {
        Session::new(Arc::clone(&self.root), Credential::from_user_id(user))
    }

    /// Resolve from the root and return the trace
    pub async fn resolve(&self, session: &Session, path: &str) -> ItemResult<ItemVector> {
        let mut trace = ItemVector::new();
        resolve_path(&RootItem, session, path, &mut trace).await?;
        Ok(trace)
    }

    /// Resolve from the root and return only the final item
    pub async fn item(&self, session: &Session, path: &str) -> ItemResult<Box<dyn Item>> {
        let mut trace = self.resolve(session, path).await?;
        Ok(trace.pop().expect("resolve_path returns a non-empty trace"))
    }

    /// Names of the children of a path
    pub async fn names(&self, session: &Session, path: &str) -> ItemResult<Vec<String>> {
        let item = self.item(session, path).await?;
        Ok(item
            .list_content(session)
            .await?
            .iter()
            .map(|i| i.name().to_string())
            .collect())
    }
}

fn push(turn: u32, user: &str) -> SlotEvent {
    SlotEvent::Push {
        turn,
        user: user.to_string(),
    }
}

fn slot(number: u32, events: Vec<SlotEvent>) -> SlotRecord {
    SlotRecord {
        number,
        history: SlotHistory::new(events),
    }
}

pub fn standard_game() -> GameSnapshot {
    GameSnapshot {
        game: GameRecord {
            id: GAME_ID,
            name: "Fixture".into(),
            directory: "games/0001".into(),
            turn: LAST_TURN,
            slots: vec![
                slot(1, vec![push(1, "a")]),
                slot(2, vec![push(1, "b"), SlotEvent::Pop { turn: 20 }, push(20, "c")]),
                slot(3, vec![push(1, "d")]),
                slot(4, vec![push(1, "e")]),
                slot(5, vec![push(1, "f"), SlotEvent::Pop { turn: 25 }]),
            ],
        },
        turns: (1..=LAST_TURN)
            .map(|turn| TurnRecord {
                turn,
                has_specification: true,
            })
            .collect(),
    }
}

/// Create the files of a game as the host would have left them
pub fn populate(files: &MemoryFileService, game: &GameRecord) {
    let dir = &game.directory;
    for name in SHARED_FILES {
        files.insert_file(&format!("{dir}/out/all/{name}"), name.as_bytes());
    }
    for slot in &game.slots {
        let n = slot.number;
        if slot.history.current().is_some() {
            files.insert_file(&format!("{dir}/out/{n}/player{n}.rst"), format!("rst {n}").as_bytes());
            files.insert_file(&format!("{dir}/in/player{n}.trn"), format!("trn {n}").as_bytes());
        }
    }
    for turn in 1..=game.turn {
        for name in SPEC_FILES {
            files.insert_file(&format!("{dir}/backup/{turn}/{name}"), name.as_bytes());
        }
        for slot in &game.slots {
            let n = slot.number;
            if slot.history.occupant_at(turn).is_none() {
                continue;
            }
            files.insert_file(
                &format!("{dir}/backup/{turn}/player{n}.rst"),
                format!("rst {n} turn {turn}").as_bytes(),
            );
            if turn > 1 {
                files.insert_file(
                    &format!("{dir}/backup/{turn}/player{n}.trn"),
                    format!("trn {n} turn {turn}").as_bytes(),
                );
            }
        }
    }
}
