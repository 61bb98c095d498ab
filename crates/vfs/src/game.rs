use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{join_path, Credential};
use tracing::debug;

use crate::error::{ItemError, ItemResult};
use crate::guard;
use crate::history::HistoryItem;
use crate::item::{default_find, list_remote_files, Info, Item, ItemVector, Label};
use crate::session::Session;
use crate::slot::GameSlotItem;
use crate::store::GameRecord;

/// Name of the history directory inside a game
pub const HISTORY: &str = "history";

/// One game
///
/// Children: the current files for all players (`out/all`), one
/// [`GameSlotItem`] per slot visible to the session, and `history`.
///
/// Game files are read with the admin credential; what a session may see is
/// decided here from the game record, not by the file service.
pub struct GameItem {
    game: Arc<GameRecord>,
    name: String,
}

impl GameItem {
    pub fn new(game: Arc<GameRecord>) -> Self {
        let name = game.id.to_string();
        Self { game, name }
    }

    /// Current files shared by all players, minus names that would hide a
    /// slot or the history directory
    async fn list_shared_files(&self, session: &Session) -> ItemResult<ItemVector> {
        let dir = join_path(&self.game.directory, "out/all");
        let files = match list_remote_files(session, &Credential::Admin, &dir).await {
            Ok(files) => files,
            Err(ItemError::NotFound(_)) => return Ok(ItemVector::new()),
            Err(e) => return Err(e),
        };
        Ok(files
            .into_iter()
            .filter(|f| !self.is_reserved(f.name()))
            .collect())
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == HISTORY
            || self
                .game
                .slots
                .iter()
                .any(|slot| slot.number.to_string() == name)
    }
}

#[async_trait]
impl Item for GameItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(&self.name)
            .with_game(self.game.id, &self.game.name)
            .with_label(Label::Game))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        if name == HISTORY {
            // Fast path: history needs no listing round trip. This item may
            // outlive the resolution that created it, so check again.
            guard::check_game_access(session, &self.game)?;
            return Ok(Some(Box::new(HistoryItem::new(Arc::clone(&self.game)))));
        }
        default_find(self, session, name).await
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        guard::check_game_access(session, &self.game)?;
        debug!(game_id = self.game.id, user = %session.user(), "list game");

        let mut result = self.list_shared_files(session).await?;
        for slot in &self.game.slots {
            if guard::may_see_slot(session, slot) {
                result.push(Box::new(GameSlotItem::new(Arc::clone(&self.game), slot.number)));
            }
        }
        result.push(Box::new(HistoryItem::new(Arc::clone(&self.game))));
        Ok(result)
    }
}
