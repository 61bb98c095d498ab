use std::sync::Arc;

use async_trait::async_trait;
use game_host_protocol::{join_path, Credential};

use crate::error::ItemResult;
use crate::file::FileItem;
use crate::item::{default_find, optional, Info, Item, ItemVector, Label};
use crate::session::Session;
use crate::store::GameRecord;

/// Current files of one player slot
///
/// Contains `player<N>.rst` (from `out/<N>/`) and `player<N>.trn` (from
/// `in/`), each only if present.
pub struct GameSlotItem {
    game: Arc<GameRecord>,
    slot: u32,
    name: String,
}

impl GameSlotItem {
    pub fn new(game: Arc<GameRecord>, slot: u32) -> Self {
        Self {
            game,
            slot,
            name: slot.to_string(),
        }
    }

    fn candidates(&self) -> [(String, String); 2] {
        let rst = format!("player{}.rst", self.slot);
        let trn = format!("player{}.trn", self.slot);
        let dir = &self.game.directory;
        [
            (join_path(dir, &format!("out/{}/{rst}", self.slot)), rst),
            (join_path(dir, &format!("in/{trn}")), trn),
        ]
    }
}

#[async_trait]
impl Item for GameSlotItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::directory(&self.name)
            .with_game(self.game.id, &self.game.name)
            .with_label(Label::Game))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        default_find(self, session, name).await
    }

    async fn list_content(&self, session: &Session) -> ItemResult<ItemVector> {
        let mut result = ItemVector::new();
        for (path, name) in self.candidates() {
            let info = optional(session.files().stat(&Credential::Admin, &path).await)?;
            if let Some(info) = info.filter(|i| i.file_type.is_file()) {
                result.push(Box::new(FileItem::new(name, path, info.size, Credential::Admin)));
            }
        }
        Ok(result)
    }
}
