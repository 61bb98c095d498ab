//! Entry points of the namespace: `/`, `game/`

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ItemResult;
use crate::game::GameItem;
use crate::guard;
use crate::item::{parse_canonical_number, Info, Item};
use crate::session::Session;
use crate::store::{ExistenceCheck, StoreError, ToolKind};
use crate::tool::ToolRootItem;

/// Root of the namespace
///
/// Not listable: enumerating every game and tool up front would cost far
/// more than any client needs. Children are `game`, `tool` and `shiplist`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RootItem;

#[async_trait]
impl Item for RootItem {
    fn name(&self) -> &str {
        "root"
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::unknown(self.name()))
    }

    async fn find(&self, _session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        if name == "game" {
            return Ok(Some(Box::new(GameRootItem)));
        }
        Ok(ToolKind::from_segment(name).map(|kind| Box::new(ToolRootItem::new(kind)) as Box<dyn Item>))
    }
}

/// `game/`: one child per game id, not listable
#[derive(Debug, Default, Clone, Copy)]
pub struct GameRootItem;

#[async_trait]
impl Item for GameRootItem {
    fn name(&self) -> &str {
        "game"
    }

    async fn info(&self, _session: &Session) -> ItemResult<Info> {
        Ok(Info::unknown(self.name()))
    }

    async fn find(&self, session: &Session, name: &str) -> ItemResult<Option<Box<dyn Item>>> {
        let Some(game_id) = parse_canonical_number(name) else {
            return Ok(None);
        };

        let store = session.games();
        let lock = match store.lock_game(game_id).await {
            Ok(lock) => lock,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // The lock proves existence; no need to check again.
        let game = store.game(&lock, ExistenceCheck::Skip).await?;
        drop(lock);

        guard::check_game_access(session, &game)?;
        debug!(game_id, user = %session.user(), "open game");
        Ok(Some(Box::new(GameItem::new(Arc::new(game)))))
    }
}

