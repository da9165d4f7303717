use serde::Deserialize;

use crate::catalog::NightActionKind;
use crate::mafia::ExecutionChoice;
use crate::room::GameSettings;

/// Intents sent by clients, as `{ "type": "...", "payload": { ... } }`.
///
/// Every variant after `Leave` targets one room and carries its id; an id that
/// does not match the sender's current room marks the intent as stale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientIntent {
    CreateRoom {
        player_name: String,
        #[serde(default)]
        settings: GameSettings,
    },
    JoinRoom {
        room_id: String,
        player_name: String,
    },
    ListRooms,
    Leave,

    // Room-scoped
    StartGame {
        room_id: String,
    },
    UpdateSettings {
        room_id: String,
        settings: GameSettings,
    },
    ToggleReady {
        room_id: String,
    },
    Chat {
        room_id: String,
        body: String,
    },

    // Mafia: targets are seat handles, as shown in the room snapshot
    DayVote {
        room_id: String,
        target_id: String,
    },
    NightAction {
        room_id: String,
        action: NightActionKind,
        target_id: String,
    },
    ExecutionVote {
        room_id: String,
        choice: ExecutionChoice,
    },
    SkipVote {
        room_id: String,
    },

    // Liar
    TurnMessage {
        room_id: String,
        body: String,
    },
    FreeMessage {
        room_id: String,
        body: String,
    },
    LiarVote {
        room_id: String,
        target_id: String,
    },
    KeywordGuess {
        room_id: String,
        guess: String,
    },
}

impl ClientIntent {
    /// The room a room-scoped intent addresses
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ClientIntent::CreateRoom { .. }
            | ClientIntent::JoinRoom { .. }
            | ClientIntent::ListRooms
            | ClientIntent::Leave => None,
            ClientIntent::StartGame { room_id }
            | ClientIntent::UpdateSettings { room_id, .. }
            | ClientIntent::ToggleReady { room_id }
            | ClientIntent::Chat { room_id, .. }
            | ClientIntent::DayVote { room_id, .. }
            | ClientIntent::NightAction { room_id, .. }
            | ClientIntent::ExecutionVote { room_id, .. }
            | ClientIntent::SkipVote { room_id }
            | ClientIntent::TurnMessage { room_id, .. }
            | ClientIntent::FreeMessage { room_id, .. }
            | ClientIntent::LiarVote { room_id, .. }
            | ClientIntent::KeywordGuess { room_id, .. } => Some(room_id),
        }
    }

    /// Wire name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientIntent::CreateRoom { .. } => "CREATE_ROOM",
            ClientIntent::JoinRoom { .. } => "JOIN_ROOM",
            ClientIntent::ListRooms => "LIST_ROOMS",
            ClientIntent::Leave => "LEAVE",
            ClientIntent::StartGame { .. } => "START_GAME",
            ClientIntent::UpdateSettings { .. } => "UPDATE_SETTINGS",
            ClientIntent::ToggleReady { .. } => "TOGGLE_READY",
            ClientIntent::Chat { .. } => "CHAT",
            ClientIntent::DayVote { .. } => "DAY_VOTE",
            ClientIntent::NightAction { .. } => "NIGHT_ACTION",
            ClientIntent::ExecutionVote { .. } => "EXECUTION_VOTE",
            ClientIntent::SkipVote { .. } => "SKIP_VOTE",
            ClientIntent::TurnMessage { .. } => "TURN_MESSAGE",
            ClientIntent::FreeMessage { .. } => "FREE_MESSAGE",
            ClientIntent::LiarVote { .. } => "LIAR_VOTE",
            ClientIntent::KeywordGuess { .. } => "KEYWORD_GUESS",
        }
    }
}
