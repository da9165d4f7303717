use serde::Serialize;

use crate::catalog::Role;
use crate::game::ChatMessage;
use crate::room::{GameKind, RoomStatus};

use super::models::{MafiaSettings, Phase};

/// A player as one particular viewer is allowed to see them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// Session id, or the seat handle while a game runs
    pub id: String,
    /// Withheld during play unless the viewer is this player
    pub name: Option<String>,
    /// Only shown to the host themself during play
    pub is_host: bool,
    pub is_ready: bool,
    pub is_dead: bool,
    pub anonymous_number: Option<u32>,
    /// Visible to the player themself, to mafia teammates, and to everyone once finished
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MafiaRoomView {
    pub id: String,
    pub game: GameKind,
    pub status: RoomStatus,
    pub phase: Option<Phase>,
    pub day: u32,
    pub players: Vec<PlayerView>,
    pub chat_messages: Vec<ChatMessage>,
    /// Only populated for mafia viewers
    pub mafia_chat: Vec<ChatMessage>,
    pub settings: MafiaSettings,
}
