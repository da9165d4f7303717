use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::{NightActionKind, Role, RoleDistribution};
use crate::game::TieBreak;
use crate::shared::GameError;

/// Hard ceiling for `max_players`
pub const PLAYER_LIMIT: usize = 20;

/// Pause after the night results before the day starts
pub const NIGHT_RESULT_DELAY: Duration = Duration::from_secs(3);
/// Pause after a day vote without a suspect before the next night
pub const VOTE_RESULT_DELAY: Duration = Duration::from_secs(2);
/// Pause after the execution result before the next night
pub const EXECUTION_RESULT_DELAY: Duration = Duration::from_secs(3);

/// Phases of a Mafia game, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Anonymous numbers are shown
    Reveal,
    /// Anonymous chat before the first night
    LobbyWait,
    Night,
    NightResult,
    Day,
    /// Day vote ended without a suspect
    VoteResult,
    FinalDefense,
    ExecutionVote,
    ExecutionResult,
}

/// Participation needed for a day vote to put someone on trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteQuorum {
    /// The top candidate goes to trial as long as anybody voted
    #[default]
    AnyVote,
    /// The top candidate needs votes from more than half of the living
    StrictMajority,
}

impl VoteQuorum {
    pub fn is_met(self, votes: usize, living: usize) -> bool {
        match self {
            VoteQuorum::AnyVote => votes > 0,
            VoteQuorum::StrictMajority => votes > living / 2,
        }
    }
}

/// Room configuration for the Mafia variant. Durations are in seconds.
///
/// `roles.citizen` is ignored: every slot not taken by a special role is a citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MafiaSettings {
    pub min_players: usize,
    pub max_players: usize,
    pub reveal_duration: u64,
    pub lobby_wait_duration: u64,
    pub night_duration: u64,
    pub day_duration: u64,
    pub final_defense_duration: u64,
    pub execution_vote_duration: u64,
    pub roles: RoleDistribution,
    pub day_vote_quorum: VoteQuorum,
    pub tie_break: TieBreak,
}

impl Default for MafiaSettings {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 12,
            reveal_duration: 5,
            lobby_wait_duration: 10,
            night_duration: 30,
            day_duration: 60,
            final_defense_duration: 30,
            execution_vote_duration: 20,
            roles: RoleDistribution {
                mafia: 1,
                doctor: 0,
                police: 0,
                citizen: 0,
            },
            day_vote_quorum: VoteQuorum::AnyVote,
            tie_break: TieBreak::NoResolution,
        }
    }
}

impl MafiaSettings {
    pub fn special_roles(&self) -> usize {
        self.roles.mafia + self.roles.doctor + self.roles.police
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.min_players == 0 {
            return Err(GameError::validation("At least one player is required"));
        }
        if self.max_players < self.min_players || self.max_players > PLAYER_LIMIT {
            return Err(GameError::validation(format!(
                "Max players must be between min players and {}",
                PLAYER_LIMIT
            )));
        }
        let durations = [
            self.reveal_duration,
            self.lobby_wait_duration,
            self.night_duration,
            self.day_duration,
            self.final_defense_duration,
            self.execution_vote_duration,
        ];
        if durations.iter().any(|d| *d == 0) {
            return Err(GameError::validation("Phase durations must be positive"));
        }
        if self.roles.mafia == 0 {
            return Err(GameError::validation("At least one mafia is required"));
        }
        if self.special_roles() >= self.min_players {
            return Err(GameError::validation(
                "Special roles must number fewer than the minimum player count",
            ));
        }
        Ok(())
    }

    /// Duration of a timed phase; result phases use their fixed delays.
    pub fn phase_duration(&self, phase: Phase) -> Duration {
        let secs = match phase {
            Phase::Reveal => self.reveal_duration,
            Phase::LobbyWait => self.lobby_wait_duration,
            Phase::Night => self.night_duration,
            Phase::Day => self.day_duration,
            Phase::FinalDefense => self.final_defense_duration,
            Phase::ExecutionVote => self.execution_vote_duration,
            Phase::NightResult => return NIGHT_RESULT_DELAY,
            Phase::VoteResult => return VOTE_RESULT_DELAY,
            Phase::ExecutionResult => return EXECUTION_RESULT_DELAY,
        };
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub role: Option<Role>,
    pub is_dead: bool,
    pub anonymous_number: Option<u32>,
    /// Handle other players address this one by while a game runs; fresh every game
    pub seat_id: Option<String>,
}

impl Player {
    pub fn new(id: String, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            is_ready: false,
            role: None,
            is_dead: false,
            anonymous_number: None,
            seat_id: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_mafia(&self) -> bool {
        self.role == Some(Role::Mafia)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAction {
    pub kind: NightActionKind,
    /// Session id of the target, resolved from the seat the actor named
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionChoice {
    Kill,
    Live,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(MafiaSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: MafiaSettings =
            serde_json::from_str(r#"{"min_players": 6, "roles": {"mafia": 2, "doctor": 1}}"#)
                .unwrap();
        assert_eq!(settings.min_players, 6);
        assert_eq!(settings.roles.mafia, 2);
        assert_eq!(settings.roles.police, 0);
        assert_eq!(settings.night_duration, 30);
        assert!(settings.validate().is_ok());
    }

    #[rstest]
    #[case(4, 4, 1, 1, 1, false)]
    #[case(4, 4, 2, 1, 1, true)]
    #[case(3, 12, 2, 1, 0, true)]
    #[case(4, 3, 1, 0, 0, true)]
    #[case(4, 21, 1, 0, 0, true)]
    #[case(0, 12, 0, 0, 0, true)]
    #[case(4, 12, 0, 1, 1, true)]
    fn test_validation(
        #[case] min: usize,
        #[case] max: usize,
        #[case] mafia: usize,
        #[case] doctor: usize,
        #[case] police: usize,
        #[case] rejected: bool,
    ) {
        let settings = MafiaSettings {
            min_players: min,
            max_players: max,
            roles: RoleDistribution {
                mafia,
                doctor,
                police,
                citizen: 0,
            },
            ..MafiaSettings::default()
        };
        assert_eq!(settings.validate().is_err(), rejected);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let settings = MafiaSettings {
            night_duration: 0,
            ..MafiaSettings::default()
        };
        assert!(matches!(settings.validate(), Err(GameError::Validation(_))));
    }

    #[rstest]
    #[case(VoteQuorum::AnyVote, 1, 6, true)]
    #[case(VoteQuorum::AnyVote, 0, 6, false)]
    #[case(VoteQuorum::StrictMajority, 3, 6, false)]
    #[case(VoteQuorum::StrictMajority, 4, 6, true)]
    #[case(VoteQuorum::StrictMajority, 3, 5, true)]
    fn test_quorum(
        #[case] quorum: VoteQuorum,
        #[case] votes: usize,
        #[case] living: usize,
        #[case] met: bool,
    ) {
        assert_eq!(quorum.is_met(votes, living), met);
    }
}
