use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::catalog::{guess_matches, random_keyword, SecretKeyword};
use crate::event::{Outbox, PlayerRef, RoomSnapshot, ServerEvent};
use crate::game::{
    count, pick, plurality, shuffled, validate_body, ChatChannel, ChatLog, ChatMessage,
};
use crate::room::{GameKind, RoomStatus, RoomSummary};
use crate::shared::GameError;

use super::models::{LiarPhase, LiarPlayer, LiarSettings, LiarWinner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiarPlayerView {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub has_voted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiarRoomView {
    pub id: String,
    pub game: GameKind,
    pub status: RoomStatus,
    pub phase: Option<LiarPhase>,
    pub players: Vec<LiarPlayerView>,
    pub chat_messages: Vec<ChatMessage>,
    pub turn_order: Vec<String>,
    pub current_turn: Option<usize>,
    pub category: Option<String>,
    /// Hidden from the liar until the game ends
    pub keyword: Option<String>,
    pub is_liar: bool,
    /// Revealed once the game ends
    pub liar_id: Option<String>,
    pub settings: LiarSettings,
}

/// One Liar game. Same contract as the Mafia room: synchronous, reporting
/// through the `Outbox`, advanced by [`LiarRoom::on_timer`].
#[derive(Debug)]
pub struct LiarRoom {
    id: String,
    status: RoomStatus,
    phase: Option<LiarPhase>,
    settings: LiarSettings,
    players: Vec<LiarPlayer>,
    chat: ChatLog,
    liar_id: Option<String>,
    /// Kept so the reveal still works after the liar leaves
    liar_name: Option<String>,
    secret: Option<SecretKeyword>,
    turn_order: Vec<String>,
    current_turn: usize,
    votes: HashMap<String, String>,
}

impl LiarRoom {
    pub fn create(
        id: String,
        host_id: &str,
        host_name: String,
        settings: LiarSettings,
        chat_capacity: usize,
        out: &mut Outbox,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let room = Self {
            id,
            status: RoomStatus::Waiting,
            phase: None,
            settings,
            players: vec![LiarPlayer::new(host_id.to_string(), host_name, true)],
            chat: ChatLog::new(chat_capacity),
            liar_id: None,
            liar_name: None,
            secret: None,
            turn_order: Vec::new(),
            current_turn: 0,
            votes: HashMap::new(),
        };

        out.send_to(
            host_id,
            ServerEvent::RoomCreated {
                room_id: room.id.clone(),
                room: room.snapshot_for(host_id),
            },
        );
        Ok(room)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn phase(&self) -> Option<LiarPhase> {
        self.phase
    }

    pub fn settings(&self) -> &LiarSettings {
        &self.settings
    }

    pub fn players(&self) -> &[LiarPlayer] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&LiarPlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn host(&self) -> Option<&LiarPlayer> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn liar_id(&self) -> Option<&str> {
        self.liar_id.as_deref()
    }

    pub fn secret(&self) -> Option<&SecretKeyword> {
        self.secret.as_ref()
    }

    pub fn turn_order(&self) -> &[String] {
        &self.turn_order
    }

    /// Whose turn it is, while in turn chat
    pub fn current_speaker(&self) -> Option<&str> {
        match self.phase {
            Some(LiarPhase::TurnChat) => self.turn_order.get(self.current_turn).map(String::as_str),
            _ => None,
        }
    }

    fn player_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            game: GameKind::Liar,
            player_count: self.players.len(),
            max_players: self.settings.max_players,
            status: self.status,
            host: self.host().map(|h| h.name.clone()),
        }
    }

    pub fn snapshot_for(&self, viewer_id: &str) -> RoomSnapshot {
        RoomSnapshot::Liar(self.view_for(viewer_id))
    }

    pub fn view_for(&self, viewer_id: &str) -> LiarRoomView {
        let finished = self.status == RoomStatus::Finished;
        let is_liar = self.liar_id.as_deref() == Some(viewer_id);
        LiarRoomView {
            id: self.id.clone(),
            game: GameKind::Liar,
            status: self.status,
            phase: self.phase,
            players: self
                .players
                .iter()
                .map(|p| LiarPlayerView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    is_host: p.is_host,
                    is_ready: p.is_ready,
                    has_voted: self.votes.contains_key(&p.id),
                })
                .collect(),
            chat_messages: self.chat.messages(),
            turn_order: self.turn_order.clone(),
            current_turn: self.current_speaker().map(|_| self.current_turn),
            category: self.secret.as_ref().map(|s| s.category.clone()),
            keyword: self
                .secret
                .as_ref()
                .filter(|_| finished || !is_liar)
                .map(|s| s.keyword.clone()),
            is_liar,
            liar_id: self.liar_id.clone().filter(|_| finished),
            settings: self.settings.clone(),
        }
    }

    fn broadcast(&self, out: &mut Outbox, event: ServerEvent) {
        out.send_to_many(self.player_ids(), event);
    }

    fn broadcast_snapshot(&self, out: &mut Outbox, make: impl Fn(RoomSnapshot) -> ServerEvent) {
        for player in &self.players {
            out.send_to(&player.id, make(self.snapshot_for(&player.id)));
        }
    }

    fn require_phase(&self, phase: LiarPhase, message: &str) -> Result<(), GameError> {
        if self.status != RoomStatus::Playing || self.phase != Some(phase) {
            return Err(GameError::unauthorized(message));
        }
        Ok(())
    }

    fn require_host(&self, player_id: &str) -> Result<(), GameError> {
        let player = self.player(player_id).ok_or(GameError::StaleIntent)?;
        if !player.is_host {
            return Err(GameError::unauthorized("Only the host can do that"));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub fn join(&mut self, player_id: &str, name: String, out: &mut Outbox) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.settings.max_players {
            return Err(GameError::RoomFull);
        }
        if self.player(player_id).is_some() {
            return Err(GameError::validation("Already in this room"));
        }

        let existing = self.player_ids();
        let is_host = self.players.is_empty();
        self.players
            .push(LiarPlayer::new(player_id.to_string(), name.clone(), is_host));

        out.send_to(
            player_id,
            ServerEvent::RoomJoined {
                room_id: self.id.clone(),
                room: self.snapshot_for(player_id),
            },
        );
        for member in existing {
            out.send_to(
                &member,
                ServerEvent::PlayerJoined {
                    player_id: player_id.to_string(),
                    player_name: name.clone(),
                    room: self.snapshot_for(&member),
                },
            );
        }
        Ok(())
    }

    /// A departed speaker is skipped, straight away if it was their turn.
    /// A departed voter's ballot is discarded, and the vote resolves once
    /// everyone left has voted. A caught liar who leaves forfeits the guess.
    pub fn remove_player(&mut self, player_id: &str, out: &mut Outbox) -> Option<LiarPlayer> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let was_speaking = self.current_speaker() == Some(player_id);
        let removed = self.players.remove(index);
        self.votes.remove(player_id);

        if self.players.is_empty() {
            return Some(removed);
        }

        let new_host = if removed.is_host {
            self.players[0].is_host = true;
            Some(self.players[0].clone())
        } else {
            None
        };

        self.broadcast_snapshot(out, |room| ServerEvent::PlayerLeft {
            player_id: removed.id.clone(),
            player_name: removed.name.clone(),
            room,
        });
        if let Some(host) = new_host {
            info!(room_id = %self.id, new_host = %host.id, "Host transferred");
            self.broadcast(
                out,
                ServerEvent::HostChanged {
                    new_host_id: host.id,
                    new_host_name: host.name,
                },
            );
        }

        if self.status == RoomStatus::Playing {
            let phase = self.phase;
            match phase {
                Some(LiarPhase::TurnChat) if was_speaking => self.advance_turn(out),
                Some(LiarPhase::Voting) if self.everyone_voted() => self.resolve_votes(out),
                Some(LiarPhase::KeywordGuess) if self.liar_id.as_deref() == Some(player_id) => {
                    self.end_game(LiarWinner::Citizen, false, out)
                }
                _ => {}
            }
        }
        Some(removed)
    }

    pub fn toggle_ready(&mut self, player_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Ok(());
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::StaleIntent)?;
        player.is_ready = !player.is_ready;
        let is_ready = player.is_ready;

        self.broadcast_snapshot(out, |room| ServerEvent::PlayerReady {
            player_id: player_id.to_string(),
            is_ready,
            room,
        });
        Ok(())
    }

    pub fn update_settings(
        &mut self,
        player_id: &str,
        settings: LiarSettings,
        out: &mut Outbox,
    ) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        self.require_host(player_id)?;
        settings.validate()?;
        if settings.max_players < self.players.len() {
            return Err(GameError::validation(
                "Max players cannot be below the current player count",
            ));
        }

        self.settings = settings;
        self.broadcast_snapshot(out, |room| ServerEvent::SettingsUpdated { room });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Game flow
    // ------------------------------------------------------------------

    pub fn start_game(&mut self, player_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        self.require_host(player_id)?;
        if self.players.len() < self.settings.min_players {
            return Err(GameError::validation(format!(
                "At least {} players are needed to start",
                self.settings.min_players
            )));
        }

        let ids = self.player_ids();
        let liar = pick(&ids)
            .and_then(|id| self.player(id))
            .cloned()
            .ok_or(GameError::StaleIntent)?;
        let secret = random_keyword();

        self.turn_order = shuffled(&ids);
        self.current_turn = 0;
        self.votes.clear();
        self.status = RoomStatus::Playing;

        info!(
            room_id = %self.id,
            players = self.players.len(),
            category = %secret.category,
            "Liar game started"
        );

        let turn_names: Vec<String> = self
            .turn_order
            .iter()
            .filter_map(|id| self.player(id).map(|p| p.name.clone()))
            .collect();
        for player in &self.players {
            let is_liar = player.id == liar.id;
            out.send_to(
                &player.id,
                ServerEvent::LiarGameStarted {
                    keyword: (!is_liar).then(|| secret.keyword.clone()),
                    category: secret.category.clone(),
                    is_liar,
                    turn_order: turn_names.clone(),
                },
            );
        }

        self.liar_id = Some(liar.id);
        self.liar_name = Some(liar.name);
        self.secret = Some(secret);
        self.phase = Some(LiarPhase::TurnChat);
        self.start_turn(out);
        Ok(())
    }

    /// Announces the speaker at `current_turn`, skipping anyone who has left.
    /// Past the end of the order, free chat begins.
    fn start_turn(&mut self, out: &mut Outbox) {
        while self
            .turn_order
            .get(self.current_turn)
            .is_some_and(|id| self.player(id).is_none())
        {
            self.current_turn += 1;
        }

        let Some(speaker) = self
            .turn_order
            .get(self.current_turn)
            .and_then(|id| self.player(id))
            .cloned()
        else {
            self.start_free_chat(out);
            return;
        };

        let duration = self.settings.phase_duration(LiarPhase::TurnChat);
        debug!(room_id = %self.id, turn = self.current_turn, speaker = %speaker.id, "Turn started");
        self.broadcast(
            out,
            ServerEvent::LiarTurnChanged {
                turn_index: self.current_turn,
                player_id: speaker.id,
                player_name: speaker.name,
                duration_secs: duration.as_secs(),
            },
        );
        out.schedule(duration);
    }

    fn advance_turn(&mut self, out: &mut Outbox) {
        self.current_turn += 1;
        self.start_turn(out);
    }

    fn start_free_chat(&mut self, out: &mut Outbox) {
        self.phase = Some(LiarPhase::FreeChat);
        let duration = self.settings.phase_duration(LiarPhase::FreeChat);
        info!(room_id = %self.id, "Free chat started");
        self.broadcast(
            out,
            ServerEvent::LiarFreeChatStarted {
                duration_secs: duration.as_secs(),
            },
        );
        out.schedule(duration);
    }

    fn start_voting(&mut self, out: &mut Outbox) {
        self.phase = Some(LiarPhase::Voting);
        self.votes.clear();
        let duration = self.settings.phase_duration(LiarPhase::Voting);
        info!(room_id = %self.id, "Liar voting started");
        self.broadcast(
            out,
            ServerEvent::LiarVotingStarted {
                duration_secs: duration.as_secs(),
            },
        );
        out.schedule(duration);
    }

    pub fn on_timer(&mut self, out: &mut Outbox) {
        if self.status != RoomStatus::Playing {
            return;
        }
        let Some(phase) = self.phase else {
            return;
        };
        debug!(room_id = %self.id, phase = ?phase, "Phase timer expired");

        match phase {
            LiarPhase::TurnChat => self.advance_turn(out),
            LiarPhase::FreeChat => self.start_voting(out),
            LiarPhase::Voting => self.resolve_votes(out),
            LiarPhase::KeywordGuess => self.end_game(LiarWinner::Citizen, false, out),
        }
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// The current speaker's statement; it also ends their turn.
    pub fn turn_message(&mut self, player_id: &str, body: &str, out: &mut Outbox) -> Result<(), GameError> {
        self.require_phase(LiarPhase::TurnChat, "Turn messages are only allowed during turn chat")?;
        if self.current_speaker() != Some(player_id) {
            return Err(GameError::unauthorized("It is not your turn"));
        }
        let body = validate_body(body)?;
        let name = self
            .player(player_id)
            .map(|p| p.name.clone())
            .ok_or(GameError::StaleIntent)?;

        let message = self.chat.push(player_id, name, body, ChatChannel::Turn);
        self.broadcast(out, ServerEvent::LiarChatMessage(message));
        self.advance_turn(out);
        Ok(())
    }

    pub fn free_message(&mut self, player_id: &str, body: &str, out: &mut Outbox) -> Result<(), GameError> {
        self.require_phase(LiarPhase::FreeChat, "Free messages are only allowed during free chat")?;
        let body = validate_body(body)?;
        let name = self
            .player(player_id)
            .map(|p| p.name.clone())
            .ok_or(GameError::StaleIntent)?;

        let message = self.chat.push(player_id, name, body, ChatChannel::Free);
        self.broadcast(out, ServerEvent::LiarChatMessage(message));
        Ok(())
    }

    /// Lobby chat before and after a game; during free chat it is a free message.
    pub fn chat(&mut self, player_id: &str, body: &str, out: &mut Outbox) -> Result<(), GameError> {
        if self.status == RoomStatus::Playing {
            return self.free_message(player_id, body, out);
        }
        let body = validate_body(body)?;
        let name = self
            .player(player_id)
            .map(|p| p.name.clone())
            .ok_or(GameError::StaleIntent)?;

        let message = self.chat.push(player_id, name, body, ChatChannel::Public);
        self.broadcast(out, ServerEvent::ChatMessage(message));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Voting and the guess
    // ------------------------------------------------------------------

    /// One ballot per player; everyone having voted resolves immediately.
    pub fn vote(&mut self, voter_id: &str, target_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        self.require_phase(LiarPhase::Voting, "Voting is not open")?;
        self.player(voter_id).ok_or(GameError::StaleIntent)?;
        if self.votes.contains_key(voter_id) {
            return Err(GameError::unauthorized("You have already voted"));
        }
        if self.player(target_id).is_none() {
            return Err(GameError::validation("Target must be a player in this room"));
        }

        self.votes
            .insert(voter_id.to_string(), target_id.to_string());
        self.broadcast(
            out,
            ServerEvent::LiarVoteStatus {
                voted: self.votes.len(),
                total: self.players.len(),
            },
        );

        if self.everyone_voted() {
            self.resolve_votes(out);
        }
        Ok(())
    }

    fn everyone_voted(&self) -> bool {
        self.players.iter().all(|p| self.votes.contains_key(&p.id))
    }

    fn resolve_votes(&mut self, out: &mut Outbox) {
        if self.phase != Some(LiarPhase::Voting) {
            return;
        }
        let tally = count(
            self.votes
                .iter()
                .filter(|(voter, target)| self.player(voter).is_some() && self.player(target).is_some())
                .map(|(_, target)| target),
        );
        let suspect = plurality(&tally, self.settings.tie_break).map(|(id, _)| id);
        info!(room_id = %self.id, suspect = ?suspect, "Liar vote resolved");

        match (suspect, self.liar_id.clone()) {
            (Some(suspect), Some(liar)) if suspect == liar => {
                self.phase = Some(LiarPhase::KeywordGuess);
                let duration = self.settings.phase_duration(LiarPhase::KeywordGuess);
                self.broadcast(
                    out,
                    ServerEvent::LiarKeywordGuess {
                        liar_id: liar,
                        duration_secs: duration.as_secs(),
                    },
                );
                out.schedule(duration);
            }
            _ => self.end_game(LiarWinner::Liar, false, out),
        }
    }

    /// The caught liar's single guess at the keyword.
    pub fn guess_keyword(&mut self, player_id: &str, guess: &str, out: &mut Outbox) -> Result<(), GameError> {
        self.require_phase(LiarPhase::KeywordGuess, "No keyword guess is pending")?;
        if self.liar_id.as_deref() != Some(player_id) {
            return Err(GameError::unauthorized("Only the liar may guess the keyword"));
        }
        let guess = validate_body(guess)?;

        let correct = self
            .secret
            .as_ref()
            .is_some_and(|secret| guess_matches(&guess, &secret.keyword));
        let winner = if correct {
            LiarWinner::Liar
        } else {
            LiarWinner::Citizen
        };
        self.end_game(winner, correct, out);
        Ok(())
    }

    fn end_game(&mut self, winner: LiarWinner, guessed_correctly: bool, out: &mut Outbox) {
        self.status = RoomStatus::Finished;
        self.phase = None;
        out.cancel_timer();

        let liar = PlayerRef {
            id: self.liar_id.clone().unwrap_or_default(),
            name: self.liar_name.clone(),
            anonymous_number: None,
        };
        let (keyword, category) = self
            .secret
            .as_ref()
            .map(|s| (s.keyword.clone(), s.category.clone()))
            .unwrap_or_default();

        info!(room_id = %self.id, winner = %winner, guessed_correctly, "Liar game over");
        self.broadcast(
            out,
            ServerEvent::LiarGameEnded {
                winner,
                liar,
                keyword,
                category,
                guessed_correctly,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TimerCommand;
    use std::time::Duration;

    fn lobby(ids: &[&str]) -> LiarRoom {
        let mut out = Outbox::new();
        let mut room = LiarRoom::create(
            "ROOM".to_string(),
            ids[0],
            ids[0].to_string(),
            LiarSettings::default(),
            100,
            &mut out,
        )
        .unwrap();
        for id in &ids[1..] {
            room.join(id, id.to_string(), &mut out).unwrap();
        }
        room
    }

    /// Started game with a fixed liar, keyword and turn order
    fn game(ids: &[&str], liar: &str) -> LiarRoom {
        let mut room = lobby(ids);
        room.start_game(ids[0], &mut Outbox::new()).unwrap();
        room.liar_id = Some(liar.to_string());
        room.liar_name = Some(liar.to_string());
        room.secret = Some(SecretKeyword {
            category: "Fruit".to_string(),
            keyword: "Apple".to_string(),
        });
        room.turn_order = ids.iter().map(|id| id.to_string()).collect();
        room.current_turn = 0;
        room
    }

    fn voting(ids: &[&str], liar: &str) -> LiarRoom {
        let mut room = game(ids, liar);
        room.phase = Some(LiarPhase::Voting);
        room
    }

    fn ended_with(out: &Outbox, player: &str) -> Option<(LiarWinner, bool)> {
        out.events_for(player).into_iter().find_map(|e| match e {
            ServerEvent::LiarGameEnded {
                winner,
                guessed_correctly,
                ..
            } => Some((*winner, *guessed_correctly)),
            _ => None,
        })
    }

    #[test]
    fn test_start_needs_three_players() {
        let mut room = lobby(&["a", "b"]);
        let result = room.start_game("a", &mut Outbox::new());
        assert!(matches!(result, Err(GameError::Validation(_))));
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn test_start_hides_keyword_from_liar_only() {
        let mut room = lobby(&["a", "b", "c"]);
        let mut out = Outbox::new();
        room.start_game("a", &mut out).unwrap();

        let liar = room.liar_id().unwrap().to_string();
        for id in ["a", "b", "c"] {
            let started = out
                .events_for(id)
                .into_iter()
                .find_map(|e| match e {
                    ServerEvent::LiarGameStarted {
                        keyword, is_liar, ..
                    } => Some((keyword.clone(), *is_liar)),
                    _ => None,
                })
                .unwrap();
            assert_eq!(started.1, id == liar);
            assert_eq!(started.0.is_none(), id == liar);
        }

        let mut order = room.turn_order().to_vec();
        order.sort();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(room.phase(), Some(LiarPhase::TurnChat));
        assert_eq!(out.timer(), Some(TimerCommand::Schedule(Duration::from_secs(15))));
    }

    #[test]
    fn test_liar_view_hides_keyword() {
        let room = game(&["a", "b", "c"], "b");
        assert_eq!(room.view_for("b").keyword, None);
        assert!(room.view_for("b").is_liar);
        assert_eq!(room.view_for("a").keyword.as_deref(), Some("Apple"));
        assert_eq!(room.view_for("a").liar_id, None);
    }

    #[test]
    fn test_only_current_speaker_may_talk() {
        let mut room = game(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        let result = room.turn_message("b", "round and red", &mut out);
        assert!(matches!(result, Err(GameError::Unauthorized(_))));

        room.turn_message("a", "round and red", &mut out).unwrap();
        assert_eq!(room.current_speaker(), Some("b"));
        assert!(out
            .events_for("c")
            .iter()
            .any(|e| e.event_type() == "LIAR_CHAT_MESSAGE"));
    }

    #[test]
    fn test_turns_advance_on_timeout_then_free_chat() {
        let mut room = game(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.on_timer(&mut out);
        room.on_timer(&mut out);
        assert_eq!(room.current_speaker(), Some("c"));

        let mut out = Outbox::new();
        room.on_timer(&mut out);
        assert_eq!(room.phase(), Some(LiarPhase::FreeChat));
        assert_eq!(out.timer(), Some(TimerCommand::Schedule(Duration::from_secs(120))));

        room.on_timer(&mut out);
        assert_eq!(room.phase(), Some(LiarPhase::Voting));
    }

    #[test]
    fn test_departed_speaker_is_skipped() {
        let mut room = game(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.remove_player("b", &mut out);
        room.on_timer(&mut out);
        assert_eq!(room.current_speaker(), Some("c"));
    }

    #[test]
    fn test_second_vote_rejected() {
        let mut room = voting(&["a", "b", "c", "d"], "b");
        let mut out = Outbox::new();
        room.vote("a", "b", &mut out).unwrap();
        let result = room.vote("a", "c", &mut out);
        assert!(matches!(result, Err(GameError::Unauthorized(_))));
        assert_eq!(room.votes.get("a").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_wrong_suspect_lets_liar_win() {
        let mut room = voting(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.vote("a", "c", &mut out).unwrap();
        room.vote("b", "c", &mut out).unwrap();
        room.vote("c", "a", &mut out).unwrap();

        assert_eq!(room.status(), RoomStatus::Finished);
        assert_eq!(ended_with(&out, "a"), Some((LiarWinner::Liar, false)));
        assert_eq!(out.timer(), Some(TimerCommand::Cancel));
    }

    #[test]
    fn test_tied_vote_lets_liar_escape() {
        let mut room = voting(&["a", "b", "c", "d"], "b");
        let mut out = Outbox::new();
        room.vote("a", "b", &mut out).unwrap();
        room.vote("c", "d", &mut out).unwrap();
        room.on_timer(&mut out);
        assert_eq!(ended_with(&out, "a"), Some((LiarWinner::Liar, false)));
    }

    #[test]
    fn test_caught_liar_guesses_keyword() {
        let mut room = voting(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.vote("a", "b", &mut out).unwrap();
        room.vote("c", "b", &mut out).unwrap();
        room.on_timer(&mut out);
        assert_eq!(room.phase(), Some(LiarPhase::KeywordGuess));
        assert!(out
            .events_for("c")
            .iter()
            .any(|e| e.event_type() == "LIAR_KEYWORD_GUESS"));

        let result = room.guess_keyword("a", "apple", &mut out);
        assert!(matches!(result, Err(GameError::Unauthorized(_))));

        let mut out = Outbox::new();
        room.guess_keyword("b", "  APPLE ", &mut out).unwrap();
        assert_eq!(ended_with(&out, "a"), Some((LiarWinner::Liar, true)));
    }

    #[test]
    fn test_wrong_guess_means_citizens_win() {
        let mut room = voting(&["a", "b", "c"], "b");
        room.phase = Some(LiarPhase::KeywordGuess);
        let mut out = Outbox::new();
        room.guess_keyword("b", "banana", &mut out).unwrap();
        assert_eq!(ended_with(&out, "c"), Some((LiarWinner::Citizen, false)));
        assert_eq!(room.view_for("c").liar_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_guess_timeout_means_citizens_win() {
        let mut room = voting(&["a", "b", "c"], "b");
        room.phase = Some(LiarPhase::KeywordGuess);
        let mut out = Outbox::new();
        room.on_timer(&mut out);
        assert_eq!(ended_with(&out, "a"), Some((LiarWinner::Citizen, false)));
    }

    #[test]
    fn test_lobby_chat_and_free_chat() {
        let mut room = lobby(&["a", "b", "c"]);
        let mut out = Outbox::new();
        room.chat("b", "hi", &mut out).unwrap();
        assert!(out
            .events_for("a")
            .iter()
            .any(|e| e.event_type() == "CHAT_MESSAGE"));

        let mut room = game(&["a", "b", "c"], "b");
        assert!(room.chat("a", "hmm", &mut Outbox::new()).is_err());
        room.phase = Some(LiarPhase::FreeChat);
        let mut out = Outbox::new();
        room.chat("a", "it is b", &mut out).unwrap();
        assert!(out
            .events_for("b")
            .iter()
            .any(|e| e.event_type() == "LIAR_CHAT_MESSAGE"));
    }

    #[test]
    fn test_current_speaker_leaving_passes_the_turn() {
        let mut room = game(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.remove_player("a", &mut out);

        assert_eq!(room.current_speaker(), Some("b"));
        assert!(out
            .events_for("c")
            .iter()
            .any(|e| e.event_type() == "LIAR_TURN_CHANGED"));
        assert_eq!(out.timer(), Some(TimerCommand::Schedule(Duration::from_secs(15))));
    }

    #[test]
    fn test_waiting_speaker_leaving_keeps_current_turn() {
        let mut room = game(&["a", "b", "c"], "b");
        let mut out = Outbox::new();
        room.remove_player("c", &mut out);
        assert_eq!(room.current_speaker(), Some("a"));
        assert_eq!(out.timer(), None);

        room.turn_message("a", "it grows on trees", &mut out).unwrap();
        room.turn_message("b", "it is sweet", &mut out).unwrap();
        assert_eq!(room.phase(), Some(LiarPhase::FreeChat));
    }

    #[test]
    fn test_last_voter_leaving_resolves_vote() {
        let mut room = voting(&["a", "b", "c", "d"], "b");
        let mut out = Outbox::new();
        room.vote("a", "b", &mut out).unwrap();
        room.vote("b", "c", &mut out).unwrap();
        room.vote("c", "b", &mut out).unwrap();
        assert_eq!(room.phase(), Some(LiarPhase::Voting));

        room.remove_player("d", &mut out);
        assert_eq!(room.phase(), Some(LiarPhase::KeywordGuess));
    }

    #[test]
    fn test_caught_liar_leaving_lets_citizens_win() {
        let mut room = voting(&["a", "b", "c"], "b");
        room.phase = Some(LiarPhase::KeywordGuess);
        let mut out = Outbox::new();
        room.remove_player("b", &mut out);
        assert_eq!(room.status(), RoomStatus::Finished);
        assert_eq!(ended_with(&out, "a"), Some((LiarWinner::Citizen, false)));
    }
}
