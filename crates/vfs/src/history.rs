//! `history/`: per-turn backups of a game
//!
//! Layout: `history/<turn>/` holds the specification files saved with that
//! turn plus one `<slot>/` directory per slot occupied at that turn, which
//! holds the slot's result file and the turn file that produced it.
//!
//! Turns below [`Options::history_start_turn`](crate::Options) have no
//! backup and do not exist here, neither do turns without a
//! [`TurnRecord`]. A user sees only the turns (and inside them the slots)
//! they occupied at that time.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{join_path, ContentInfoMap, Credential, FileInfo};
use tracing::debug;

use crate::error::ItemResult;
use crate::file::FileItem;
use crate::game::HISTORY;
use crate::guard;
use crate::item::{default_find, parse_canonical_number, Info, Item, ItemVector, Label};
use crate::session::Session;
use crate::store::{GameRecord, TurnRecord};

pub struct HistoryItem {
    game: Arc<GameRecord>,
}

impl HistoryItem {
    pub const fn new(game: Arc<GameRecord>) -> Self {
        Self { game }
    }

    fn in_range(&self, session: &Session, turn: u32) -> bool {
        turn >= session.options().history_start_turn && turn <= self.game.turn
    }
}

#[async_trait]
impl Item for HistoryItem {
    fn name(&self) -> &str {
        HISTORY
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(HISTORY)
            .with_game(self.game.id, &self.game.name)
            .with_label(Label::History))
    }

    /// Resolves straight from the record store, without listing all turns
    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        let Some(turn) = parse_canonical_number(name) else {
            return Ok(None);
        };
        if !self.in_range(session, turn) || !guard::may_see_turn(session, &self.game, turn) {
            return Ok(None);
        }
        let record = session.games().turn(self.game.id, turn).await?;
        Ok(record.map(|record| {
            Box::new(HistoryTurnItem::new(Arc::clone(&self.game), record)) as Box<dyn Item>
        }))
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        guard::check_game_access(session, &self.game)?;
        let turns = session.games().turns(self.game.id).await?;
        Ok(turns
            .into_iter()
            .filter(|t| self.in_range(session, t.turn))
            .filter(|t| guard::may_see_turn(session, &self.game, t.turn))
            .map(|t| Box::new(HistoryTurnItem::new(Arc::clone(&self.game), t)) as Box<dyn Item>)
            .collect())
    }
}

/// One turn's backup
pub struct HistoryTurnItem {
    game: Arc<GameRecord>,
    record: TurnRecord,
    name: String,
}

impl HistoryTurnItem {
    pub fn new(game: Arc<GameRecord>, record: TurnRecord) -> Self {
        Self {
            game,
            record,
            name: record.turn.to_string(),
        }
    }

    fn backup_dir(&self) -> String {
        join_path(&self.game.directory, &format!("backup/{}", self.record.turn))
    }

    async fn fetch_backup(&self, session: &Session) -> ItemResult<ContentInfoMap> {
        let dir = self.backup_dir();
        debug!(game_id = self.game.id, turn = self.record.turn, "list backup");
        match session.files().list(&Credential::Admin, &dir).await {
            Ok(listing) => Ok(listing),
            Err(e) if e.is_not_found() => Ok(ContentInfoMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Item for HistoryTurnItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(&self.name)
            .with_game(self.game.id, &self.game.name)
            .with_label(Label::History))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        default_find(self, session, name).await
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        let turn = self.record.turn;
        let dir = self.backup_dir();
        let listing = self.fetch_backup(session).await?;

        let mut result = ItemVector::new();
        let mut player_files: BTreeMap<u32, Vec<FileItem>> = BTreeMap::new();
        for (name, info) in listing {
            if !info.file_type.is_file() {
                continue;
            }
            let path = join_path(&dir, &name);
            match parse_player_file(&name) {
                // the first turn was not produced by a turn file
                Some((slot, kind)) if kind == PlayerFile::Result || turn > 1 => {
                    player_files.entry(slot).or_default().push(file(name, path, info));
                }
                Some(_) => {}
                None if self.record.has_specification => {
                    result.push(Box::new(file(name, path, info)));
                }
                None => {}
            }
        }

        for slot in &self.game.slots {
            if slot.history.occupant_at(turn).is_none()
                || !guard::may_see_slot_at(session, slot, turn)
            {
                continue;
            }
            result.push(Box::new(HistorySlotItem {
                game: Arc::clone(&self.game),
                name: slot.number.to_string(),
                files: player_files.remove(&slot.number).unwrap_or_default(),
            }));
        }
        Ok(result)
    }
}

/// One slot inside a turn's backup
///
/// Its files come from the parent's listing, so listing it costs nothing.
pub struct HistorySlotItem {
    game: Arc<GameRecord>,
    name: String,
    files: Vec<FileItem>,
}

#[async_trait]
impl Item for HistorySlotItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(&self.name)
            .with_game(self.game.id, &self.game.name)
            .with_label(Label::History))
    }

    async fn find(&self, _session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        Ok(self
            .files
            .iter()
            .find(|f| f.name() == name)
            .map(|f| Box::new(f.clone()) as Box<dyn Item>))
    }

    async fn list_content(&self, _session: &Session) -> ItemResult<ItemVector> {
        Ok(self
            .files
            .iter()
            .map(|f| Box::new(f.clone()) as Box<dyn Item>)
            .collect())
    }
}

fn file(name: String, path: String, info: FileInfo) -> FileItem {
    FileItem::new(name, path, info.size, Credential::Admin)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerFile {
    Result,
    Turn,
}

/// Recognize `player<N>.rst` / `player<N>.trn`
fn parse_player_file(name: &str) -> Option<(u32, PlayerFile)> {
    let (stem, extension) = name.strip_prefix("player")?.split_once('.')?;
    let kind = match extension {
        "rst" => PlayerFile::Result,
        "trn" => PlayerFile::Turn,
        _ => return None,
    };
    Some((parse_canonical_number(stem)?, kind))
}
