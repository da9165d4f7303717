use serde::{Deserialize, Serialize};

use crate::liar::LiarSettings;
use crate::mafia::MafiaSettings;

/// Lifecycle of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Join, leave, ready and settings changes allowed
    Waiting,
    /// Membership is locked
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[default]
    Mafia,
    Liar,
}

/// Settings sent with a create-room intent, tagged by game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameSettings {
    Mafia(MafiaSettings),
    Liar(LiarSettings),
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings::Mafia(MafiaSettings::default())
    }
}

impl GameSettings {
    pub fn kind(&self) -> GameKind {
        match self {
            GameSettings::Mafia(_) => GameKind::Mafia,
            GameSettings::Liar(_) => GameKind::Liar,
        }
    }
}

/// Room browser entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub game: GameKind,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatus,
    /// Host's name; withheld while a Mafia game runs
    pub host: Option<String>,
}
