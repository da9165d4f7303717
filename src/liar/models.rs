use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::TieBreak;
use crate::mafia::PLAYER_LIMIT;
use crate::shared::GameError;

/// Smallest table that still leaves the liar two people to fool
pub const LIAR_MIN_PLAYERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiarPhase {
    /// Players speak one at a time in turn order
    TurnChat,
    FreeChat,
    Voting,
    /// The accused liar gets one guess at the keyword
    KeywordGuess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LiarWinner {
    Liar,
    Citizen,
}

/// Room configuration for the Liar variant. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiarSettings {
    pub min_players: usize,
    pub max_players: usize,
    pub turn_duration: u64,
    pub free_chat_duration: u64,
    pub voting_duration: u64,
    pub keyword_guess_duration: u64,
    pub tie_break: TieBreak,
}

impl Default for LiarSettings {
    fn default() -> Self {
        Self {
            min_players: LIAR_MIN_PLAYERS,
            max_players: 12,
            turn_duration: 15,
            free_chat_duration: 120,
            voting_duration: 30,
            keyword_guess_duration: 30,
            tie_break: TieBreak::NoResolution,
        }
    }
}

impl LiarSettings {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.min_players < LIAR_MIN_PLAYERS {
            return Err(GameError::validation(format!(
                "At least {} players are required",
                LIAR_MIN_PLAYERS
            )));
        }
        if self.max_players < self.min_players || self.max_players > PLAYER_LIMIT {
            return Err(GameError::validation(format!(
                "Max players must be between min players and {}",
                PLAYER_LIMIT
            )));
        }
        let durations = [
            self.turn_duration,
            self.free_chat_duration,
            self.voting_duration,
            self.keyword_guess_duration,
        ];
        if durations.contains(&0) {
            return Err(GameError::validation("Phase durations must be positive"));
        }
        Ok(())
    }

    pub fn phase_duration(&self, phase: LiarPhase) -> Duration {
        Duration::from_secs(match phase {
            LiarPhase::TurnChat => self.turn_duration,
            LiarPhase::FreeChat => self.free_chat_duration,
            LiarPhase::Voting => self.voting_duration,
            LiarPhase::KeywordGuess => self.keyword_guess_duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiarPlayer {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
}

impl LiarPlayer {
    pub fn new(id: String, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            is_ready: false,
        }
    }
}
