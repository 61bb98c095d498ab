//! Who may see which part of a game
//!
//! Admin sees everything. A user sees a game if they ever occupied one of
//! its slots, and inside it only the slots (and history turns) they
//! occupied.

use game_host_protocol::Credential;
use tracing::warn;

use crate::error::{ItemError, ItemResult};
use crate::session::Session;
use crate::store::{GameRecord, SlotRecord};

/// True if the session may open the game at all
pub fn may_access_game(session: &Session, game: &GameRecord) -> bool {
    session.user().is_admin()
        || game.slots.iter().any(|slot| may_see_slot(session, slot))
}

/// Fail with PermissionDenied unless the session may open the game
pub fn check_game_access(session: &Session, game: &GameRecord) -> ItemResult<()> {
    if may_access_game(session, game) {
        Ok(())
    } else {
        warn!(game_id = game.id, user = %session.user(), "game access denied");
        Err(ItemError::permission_denied(format!("game {}", game.id)))
    }
}

/// True if the session may see a slot's current files
pub fn may_see_slot(session: &Session, slot: &SlotRecord) -> bool {
    match session.user() {
        Credential::Admin => true,
        Credential::User(user) => slot.history.has_occupied(user),
    }
}

/// True if the session may see a slot's files as of `turn`
pub fn may_see_slot_at(session: &Session, slot: &SlotRecord, turn: u32) -> bool {
    let user = session.user();
    user.is_admin()
        || slot
            .history
            .occupant_at(turn)
            .is_some_and(|occupant| user.is_user(occupant))
}

/// True if the session may see the backup of `turn`
pub fn may_see_turn(session: &Session, game: &GameRecord, turn: u32) -> bool {
    session.user().is_admin()
        || game
            .slots
            .iter()
            .any(|slot| may_see_slot_at(session, slot, turn))
}
