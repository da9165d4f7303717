use crate::event::{Outbox, RoomSnapshot};
use crate::liar::LiarRoom;
use crate::mafia::MafiaRoom;
use crate::shared::GameError;
use crate::websockets::ClientIntent;

use super::types::{GameKind, GameSettings, RoomStatus, RoomSummary};

/// A live room of either variant
#[derive(Debug)]
pub enum GameRoom {
    Mafia(MafiaRoom),
    Liar(LiarRoom),
}

impl GameRoom {
    pub fn create(
        id: String,
        host_id: &str,
        host_name: String,
        settings: GameSettings,
        chat_capacity: usize,
        out: &mut Outbox,
    ) -> Result<Self, GameError> {
        Ok(match settings {
            GameSettings::Mafia(settings) => GameRoom::Mafia(MafiaRoom::create(
                id,
                host_id,
                host_name,
                settings,
                chat_capacity,
                out,
            )?),
            GameSettings::Liar(settings) => GameRoom::Liar(LiarRoom::create(
                id,
                host_id,
                host_name,
                settings,
                chat_capacity,
                out,
            )?),
        })
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameRoom::Mafia(_) => GameKind::Mafia,
            GameRoom::Liar(_) => GameKind::Liar,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            GameRoom::Mafia(room) => room.id(),
            GameRoom::Liar(room) => room.id(),
        }
    }

    pub fn status(&self) -> RoomStatus {
        match self {
            GameRoom::Mafia(room) => room.status(),
            GameRoom::Liar(room) => room.status(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            GameRoom::Mafia(room) => room.is_empty(),
            GameRoom::Liar(room) => room.is_empty(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        match self {
            GameRoom::Mafia(room) => room.summary(),
            GameRoom::Liar(room) => room.summary(),
        }
    }

    pub fn snapshot_for(&self, viewer_id: &str) -> RoomSnapshot {
        match self {
            GameRoom::Mafia(room) => room.snapshot_for(viewer_id),
            GameRoom::Liar(room) => room.snapshot_for(viewer_id),
        }
    }

    pub fn join(&mut self, player_id: &str, name: String, out: &mut Outbox) -> Result<(), GameError> {
        match self {
            GameRoom::Mafia(room) => room.join(player_id, name, out),
            GameRoom::Liar(room) => room.join(player_id, name, out),
        }
    }

    /// Returns whether the player was in the room
    pub fn remove_player(&mut self, player_id: &str, out: &mut Outbox) -> bool {
        match self {
            GameRoom::Mafia(room) => room.remove_player(player_id, out).is_some(),
            GameRoom::Liar(room) => room.remove_player(player_id, out).is_some(),
        }
    }

    pub fn on_timer(&mut self, out: &mut Outbox) {
        match self {
            GameRoom::Mafia(room) => room.on_timer(out),
            GameRoom::Liar(room) => room.on_timer(out),
        }
    }

    /// Hands a room-scoped intent to the variant that understands it.
    pub fn apply(&mut self, player_id: &str, intent: ClientIntent, out: &mut Outbox) -> Result<(), GameError> {
        match (self, intent) {
            (GameRoom::Mafia(room), ClientIntent::StartGame { .. }) => room.start_game(player_id, out),
            (GameRoom::Liar(room), ClientIntent::StartGame { .. }) => room.start_game(player_id, out),

            (GameRoom::Mafia(room), ClientIntent::ToggleReady { .. }) => room.toggle_ready(player_id, out),
            (GameRoom::Liar(room), ClientIntent::ToggleReady { .. }) => room.toggle_ready(player_id, out),

            (GameRoom::Mafia(room), ClientIntent::Chat { body, .. }) => room.chat(player_id, &body, out),
            (GameRoom::Liar(room), ClientIntent::Chat { body, .. }) => room.chat(player_id, &body, out),

            (GameRoom::Mafia(room), ClientIntent::UpdateSettings { settings, .. }) => match settings {
                GameSettings::Mafia(settings) => room.update_settings(player_id, settings, out),
                GameSettings::Liar(_) => Err(GameError::validation("Settings are for a different game")),
            },
            (GameRoom::Liar(room), ClientIntent::UpdateSettings { settings, .. }) => match settings {
                GameSettings::Liar(settings) => room.update_settings(player_id, settings, out),
                GameSettings::Mafia(_) => Err(GameError::validation("Settings are for a different game")),
            },

            (GameRoom::Mafia(room), ClientIntent::DayVote { target_id, .. }) => {
                room.day_vote(player_id, &target_id, out)
            }
            (GameRoom::Mafia(room), ClientIntent::NightAction { action, target_id, .. }) => {
                room.night_action(player_id, action, &target_id, out)
            }
            (GameRoom::Mafia(room), ClientIntent::ExecutionVote { choice, .. }) => {
                room.execution_vote(player_id, choice, out)
            }
            (GameRoom::Mafia(room), ClientIntent::SkipVote { .. }) => room.skip_vote(player_id, out),

            (GameRoom::Liar(room), ClientIntent::TurnMessage { body, .. }) => {
                room.turn_message(player_id, &body, out)
            }
            (GameRoom::Liar(room), ClientIntent::FreeMessage { body, .. }) => {
                room.free_message(player_id, &body, out)
            }
            (GameRoom::Liar(room), ClientIntent::LiarVote { target_id, .. }) => {
                room.vote(player_id, &target_id, out)
            }
            (GameRoom::Liar(room), ClientIntent::KeywordGuess { guess, .. }) => {
                room.guess_keyword(player_id, &guess, out)
            }

            (_, intent) if intent.room_id().is_none() => Err(GameError::StaleIntent),
            (_, intent) => Err(GameError::unauthorized(format!(
                "{} is not part of this game",
                intent.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liar::LiarSettings;
    use crate::mafia::MafiaSettings;

    fn mafia_room() -> GameRoom {
        GameRoom::create(
            "r1".to_string(),
            "a",
            "alice".to_string(),
            GameSettings::Mafia(MafiaSettings::default()),
            100,
            &mut Outbox::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_by_settings_kind() {
        let room = GameRoom::create(
            "r2".to_string(),
            "a",
            "alice".to_string(),
            GameSettings::Liar(LiarSettings::default()),
            100,
            &mut Outbox::new(),
        )
        .unwrap();
        assert_eq!(room.kind(), GameKind::Liar);
        assert_eq!(room.summary().player_count, 1);
        assert_eq!(mafia_room().kind(), GameKind::Mafia);
    }

    #[test]
    fn test_other_variant_intent_is_unauthorized() {
        let mut room = mafia_room();
        let result = room.apply(
            "a",
            ClientIntent::KeywordGuess {
                room_id: "r1".to_string(),
                guess: "apple".to_string(),
            },
            &mut Outbox::new(),
        );
        assert!(matches!(result, Err(GameError::Unauthorized(_))));
    }

    #[test]
    fn test_mismatched_settings_rejected() {
        let mut room = mafia_room();
        let result = room.apply(
            "a",
            ClientIntent::UpdateSettings {
                room_id: "r1".to_string(),
                settings: GameSettings::Liar(LiarSettings::default()),
            },
            &mut Outbox::new(),
        );
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    #[test]
    fn test_chat_dispatches_to_room() {
        let mut room = mafia_room();
        let mut out = Outbox::new();
        room.apply(
            "a",
            ClientIntent::Chat {
                room_id: "r1".to_string(),
                body: "hello".to_string(),
            },
            &mut out,
        )
        .unwrap();
        assert_eq!(out.events_for("a").len(), 1);
    }
}
