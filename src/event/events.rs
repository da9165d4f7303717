use serde::Serialize;

use crate::catalog::{NightActionKind, Role, RoleInfo, Team};
use crate::game::ChatMessage;
use crate::liar::{LiarRoomView, LiarWinner};
use crate::mafia::{MafiaRoomView, Phase};
use crate::room::RoomSummary;

/// Snapshot of a room as seen by one particular player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoomSnapshot {
    Mafia(MafiaRoomView),
    Liar(LiarRoomView),
}

/// Reference to a player as it may be shown to the recipient.
///
/// During a Mafia game `name` is withheld, the anonymous number stands in for
/// it and `id` is the player's seat handle rather than their session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: Option<String>,
    pub anonymous_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub target: PlayerRef,
    pub votes: usize,
}

/// Events sent from the server to connected players.
///
/// Serialized as `{ "type": "...", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    Connected {
        session_id: String,
    },
    RoomCreated {
        room_id: String,
        room: RoomSnapshot,
    },
    RoomJoined {
        room_id: String,
        room: RoomSnapshot,
    },
    PlayerJoined {
        player_id: String,
        player_name: String,
        room: RoomSnapshot,
    },
    PlayerLeft {
        player_id: String,
        player_name: String,
        room: RoomSnapshot,
    },
    HostChanged {
        new_host_id: String,
        new_host_name: String,
    },
    SettingsUpdated {
        room: RoomSnapshot,
    },
    PlayerReady {
        player_id: String,
        is_ready: bool,
        room: RoomSnapshot,
    },
    RoleAssigned {
        role: Role,
        info: RoleInfo,
        anonymous_number: u32,
        /// The recipient's own handle for this game
        seat_id: String,
        /// Other mafia members; empty for every other role
        teammates: Vec<PlayerRef>,
    },
    PhaseChanged {
        phase: Phase,
        day: u32,
        duration_secs: u64,
        suspect: Option<PlayerRef>,
        room: RoomSnapshot,
    },
    ChatMessage(ChatMessage),
    NightActionRecorded {
        action: NightActionKind,
        target: PlayerRef,
    },
    NightResults {
        killed: Option<PlayerRef>,
        saved: bool,
        room: RoomSnapshot,
    },
    InvestigationResult {
        target: PlayerRef,
        is_mafia: bool,
    },
    VoteStatus {
        votes: Vec<VoteCount>,
    },
    VoteResolved {
        suspect: Option<PlayerRef>,
        votes: Vec<VoteCount>,
    },
    ExecutionVoteStatus {
        kill_votes: usize,
        live_votes: usize,
    },
    ExecutionResult {
        executed: bool,
        player: Option<PlayerRef>,
        role: Option<Role>,
        kill_votes: usize,
        live_votes: usize,
        room: RoomSnapshot,
    },
    SkipVoteStatus {
        current_votes: usize,
        votes_needed: usize,
    },
    TimeSkipped {
        phase: Phase,
    },
    GameOver {
        winner: Team,
        reason: String,
        room: RoomSnapshot,
    },
    LiarGameStarted {
        /// Withheld from the liar
        keyword: Option<String>,
        category: String,
        is_liar: bool,
        turn_order: Vec<String>,
    },
    LiarTurnChanged {
        turn_index: usize,
        player_id: String,
        player_name: String,
        duration_secs: u64,
    },
    LiarChatMessage(ChatMessage),
    LiarFreeChatStarted {
        duration_secs: u64,
    },
    LiarVotingStarted {
        duration_secs: u64,
    },
    LiarVoteStatus {
        voted: usize,
        total: usize,
    },
    LiarKeywordGuess {
        liar_id: String,
        duration_secs: u64,
    },
    LiarGameEnded {
        winner: LiarWinner,
        liar: PlayerRef,
        keyword: String,
        category: String,
        guessed_correctly: bool,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    /// Wire name of the event, for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "CONNECTED",
            ServerEvent::RoomCreated { .. } => "ROOM_CREATED",
            ServerEvent::RoomJoined { .. } => "ROOM_JOINED",
            ServerEvent::PlayerJoined { .. } => "PLAYER_JOINED",
            ServerEvent::PlayerLeft { .. } => "PLAYER_LEFT",
            ServerEvent::HostChanged { .. } => "HOST_CHANGED",
            ServerEvent::SettingsUpdated { .. } => "SETTINGS_UPDATED",
            ServerEvent::PlayerReady { .. } => "PLAYER_READY",
            ServerEvent::RoleAssigned { .. } => "ROLE_ASSIGNED",
            ServerEvent::PhaseChanged { .. } => "PHASE_CHANGED",
            ServerEvent::ChatMessage(_) => "CHAT_MESSAGE",
            ServerEvent::NightActionRecorded { .. } => "NIGHT_ACTION_RECORDED",
            ServerEvent::NightResults { .. } => "NIGHT_RESULTS",
            ServerEvent::InvestigationResult { .. } => "INVESTIGATION_RESULT",
            ServerEvent::VoteStatus { .. } => "VOTE_STATUS",
            ServerEvent::VoteResolved { .. } => "VOTE_RESOLVED",
            ServerEvent::ExecutionVoteStatus { .. } => "EXECUTION_VOTE_STATUS",
            ServerEvent::ExecutionResult { .. } => "EXECUTION_RESULT",
            ServerEvent::SkipVoteStatus { .. } => "SKIP_VOTE_STATUS",
            ServerEvent::TimeSkipped { .. } => "TIME_SKIPPED",
            ServerEvent::GameOver { .. } => "GAME_OVER",
            ServerEvent::LiarGameStarted { .. } => "LIAR_GAME_STARTED",
            ServerEvent::LiarTurnChanged { .. } => "LIAR_TURN_CHANGED",
            ServerEvent::LiarChatMessage(_) => "LIAR_CHAT_MESSAGE",
            ServerEvent::LiarFreeChatStarted { .. } => "LIAR_FREE_CHAT_STARTED",
            ServerEvent::LiarVotingStarted { .. } => "LIAR_VOTING_STARTED",
            ServerEvent::LiarVoteStatus { .. } => "LIAR_VOTE_STATUS",
            ServerEvent::LiarKeywordGuess { .. } => "LIAR_KEYWORD_GUESS",
            ServerEvent::LiarGameEnded { .. } => "LIAR_GAME_ENDED",
            ServerEvent::RoomList { .. } => "ROOM_LIST",
            ServerEvent::Error { .. } => "ERROR",
        }
    }

    pub fn error(err: &crate::shared::GameError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::GameError;

    #[test]
    fn test_wire_envelope() {
        let event = ServerEvent::SkipVoteStatus {
            current_votes: 2,
            votes_needed: 3,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "SKIP_VOTE_STATUS");
        assert_eq!(value["payload"]["current_votes"], 2);
        assert_eq!(value["payload"]["votes_needed"], 3);
        assert_eq!(event.event_type(), "SKIP_VOTE_STATUS");
    }

    #[test]
    fn test_error_event() {
        let value = serde_json::to_value(ServerEvent::error(&GameError::RoomFull)).unwrap();
        assert_eq!(value["type"], "ERROR");
        assert_eq!(value["payload"]["code"], "ROOM_FULL");
        assert_eq!(value["payload"]["message"], "Room is full");
    }
}
