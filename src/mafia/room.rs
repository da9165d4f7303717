use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{NightActionKind, Role, Team};
use crate::event::{Outbox, PlayerRef, RoomSnapshot, ServerEvent, VoteCount};
use crate::game::{count, plurality, shuffled, validate_body, ChatChannel, ChatLog};
use crate::room::{GameKind, RoomStatus, RoomSummary};
use crate::shared::GameError;

use super::models::{
    ExecutionChoice, MafiaSettings, NightAction, Phase, Player, EXECUTION_RESULT_DELAY,
    NIGHT_RESULT_DELAY, VOTE_RESULT_DELAY,
};
use super::views::{MafiaRoomView, PlayerView};

/// One Mafia game: players, roles, the active phase and its tallies.
///
/// Every method runs to completion and reports what happened through the
/// `Outbox`: events addressed to player ids, plus at most one timer request.
/// The room never schedules anything itself; when the requested timer fires
/// the owner calls [`MafiaRoom::on_timer`].
#[derive(Debug)]
pub struct MafiaRoom {
    id: String,
    status: RoomStatus,
    phase: Option<Phase>,
    day: u32,
    settings: MafiaSettings,
    /// Join order; the host is the earliest remaining player
    players: Vec<Player>,
    chat: ChatLog,
    mafia_chat: ChatLog,
    night_actions: HashMap<String, NightAction>,
    day_votes: HashMap<String, String>,
    execution_votes: HashMap<String, ExecutionChoice>,
    skip_votes: HashSet<String>,
    suspect_id: Option<String>,
}

impl MafiaRoom {
    /// Creates a room whose only player is the host and tells the host about it.
    pub fn create(
        id: String,
        host_id: &str,
        host_name: String,
        settings: MafiaSettings,
        chat_capacity: usize,
        out: &mut Outbox,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let room = Self {
            id,
            status: RoomStatus::Waiting,
            phase: None,
            day: 0,
            settings,
            players: vec![Player::new(host_id.to_string(), host_name, true)],
            chat: ChatLog::new(chat_capacity),
            mafia_chat: ChatLog::new(chat_capacity),
            night_actions: HashMap::new(),
            day_votes: HashMap::new(),
            execution_votes: HashMap::new(),
            skip_votes: HashSet::new(),
            suspect_id: None,
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

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn settings(&self) -> &MafiaSettings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn suspect_id(&self) -> Option<&str> {
        self.suspect_id.as_deref()
    }

    fn player_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living_players().count()
    }

    fn is_living(&self, player_id: &str) -> bool {
        self.player(player_id).is_some_and(|p| p.is_alive())
    }

    fn has_living_role(&self, player_id: &str, role: Role) -> bool {
        self.player(player_id)
            .is_some_and(|p| p.is_alive() && p.role == Some(role))
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            game: GameKind::Mafia,
            player_count: self.players.len(),
            max_players: self.settings.max_players,
            status: self.status,
            host: self
                .host()
                .filter(|_| self.status != RoomStatus::Playing)
                .map(|h| h.name.clone()),
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn snapshot_for(&self, viewer_id: &str) -> RoomSnapshot {
        RoomSnapshot::Mafia(self.view_for(viewer_id))
    }

    /// The room as `viewer_id` may see it. During play other players are only
    /// known by seat and number, and roles are only shown to their owner and
    /// to mafia teammates.
    pub fn view_for(&self, viewer_id: &str) -> MafiaRoomView {
        let viewer_is_mafia = self.player(viewer_id).is_some_and(|v| v.is_mafia());
        let playing = self.status == RoomStatus::Playing;
        let finished = self.status == RoomStatus::Finished;

        let players = self
            .players
            .iter()
            .map(|p| {
                let is_self = p.id == viewer_id;
                PlayerView {
                    id: self.public_id(p),
                    name: (!playing || is_self).then(|| p.name.clone()),
                    is_host: p.is_host && (!playing || is_self),
                    is_ready: p.is_ready,
                    is_dead: p.is_dead,
                    anonymous_number: p.anonymous_number,
                    role: if finished || is_self || (viewer_is_mafia && p.is_mafia()) {
                        p.role
                    } else {
                        None
                    },
                }
            })
            .collect();

        MafiaRoomView {
            id: self.id.clone(),
            game: GameKind::Mafia,
            status: self.status,
            phase: self.phase,
            day: self.day,
            players,
            chat_messages: self.chat.messages(),
            mafia_chat: if viewer_is_mafia || finished {
                self.mafia_chat.messages()
            } else {
                Vec::new()
            },
            settings: self.settings.clone(),
        }
    }

    /// The handle other players know `player` by: the seat while the game
    /// runs, the session id otherwise.
    fn public_id(&self, player: &Player) -> String {
        match (self.status, &player.seat_id) {
            (RoomStatus::Playing, Some(seat)) => seat.clone(),
            _ => player.id.clone(),
        }
    }

    /// The player a client-supplied handle refers to
    fn find_by_handle(&self, handle: &str) -> Option<&Player> {
        self.players.iter().find(|p| self.public_id(p) == handle)
    }

    /// Room-wide reference to a player, anonymised while the game runs
    fn player_ref(&self, player: &Player) -> PlayerRef {
        PlayerRef {
            id: self.public_id(player),
            name: (self.status != RoomStatus::Playing).then(|| player.name.clone()),
            anonymous_number: player.anonymous_number,
        }
    }

    fn ref_by_id(&self, player_id: &str) -> Option<PlayerRef> {
        self.player(player_id).map(|p| self.player_ref(p))
    }

    fn display_name(&self, player: &Player) -> String {
        match (self.status, player.anonymous_number) {
            (RoomStatus::Playing, Some(number)) => format!("#{}", number),
            _ => player.name.clone(),
        }
    }

    fn broadcast(&self, out: &mut Outbox, event: ServerEvent) {
        out.send_to_many(self.player_ids(), event);
    }

    /// Sends every player the event built around their own snapshot
    fn broadcast_snapshot(&self, out: &mut Outbox, make: impl Fn(RoomSnapshot) -> ServerEvent) {
        for player in &self.players {
            out.send_to(&player.id, make(self.snapshot_for(&player.id)));
        }
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
            .push(Player::new(player_id.to_string(), name.clone(), is_host));

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

    /// Removes a player, handing the host role to the earliest-joined
    /// remaining player (the earliest living one during play).
    ///
    /// The phase timer keeps running and the departed player drops out of
    /// every tally. If everyone still due to act already has, the phase
    /// resolves at once.
    pub fn remove_player(&mut self, player_id: &str, out: &mut Outbox) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let left_id = self.public_id(&self.players[index]);
        let left_name = self.display_name(&self.players[index]);
        let removed = self.players.remove(index);

        self.night_actions.remove(player_id);
        self.day_votes.remove(player_id);
        self.execution_votes.remove(player_id);
        self.skip_votes.remove(player_id);

        if self.players.is_empty() {
            return Some(removed);
        }

        let playing = self.status == RoomStatus::Playing;
        let new_host = if removed.is_host {
            let successor = if playing {
                self.players.iter().position(|p| p.is_alive()).unwrap_or(0)
            } else {
                0
            };
            self.players[successor].is_host = true;
            Some(self.players[successor].clone())
        } else {
            None
        };

        self.broadcast_snapshot(out, |room| ServerEvent::PlayerLeft {
            player_id: left_id.clone(),
            player_name: left_name.clone(),
            room,
        });

        if let Some(host) = new_host {
            info!(room_id = %self.id, new_host = %host.id, "Host transferred");
            let event = ServerEvent::HostChanged {
                new_host_id: self.public_id(&host),
                new_host_name: self.display_name(&host),
            };
            // Naming the host mid-game would tie a seat to a lobby name
            if playing {
                out.send_to(&host.id, event);
            } else {
                self.broadcast(out, event);
            }
        }

        if playing && removed.is_alive() {
            self.settle_after_departure(out);
        }
        Some(removed)
    }

    /// Ends the game or the current phase when a departure already decided it.
    fn settle_after_departure(&mut self, out: &mut Outbox) {
        if self.check_win(out) {
            return;
        }
        let phase = self.phase;
        match phase {
            Some(Phase::Night) if self.night_complete() => self.resolve_night(out),
            Some(Phase::Day) if self.all_living_voted(&self.day_votes) => self.resolve_day(out),
            Some(Phase::ExecutionVote) if self.all_living_voted(&self.execution_votes) => {
                self.resolve_execution(out)
            }
            Some(phase @ (Phase::Day | Phase::Night))
                if self.skip_count() > 0 && self.skip_count() >= self.skip_votes_needed() =>
            {
                self.skip_phase(phase, out)
            }
            _ => {}
        }
    }

    fn all_living_voted<V>(&self, ballots: &HashMap<String, V>) -> bool {
        self.living_players().all(|p| ballots.contains_key(&p.id))
    }

    /// Ready flags only matter before the game; afterwards the toggle is ignored.
    pub fn toggle_ready(&mut self, player_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Ok(());
        }
        let player = self.player_mut(player_id).ok_or(GameError::StaleIntent)?;
        player.is_ready = !player.is_ready;
        let is_ready = player.is_ready;

        self.broadcast_snapshot(out, |room| ServerEvent::PlayerReady {
            player_id: player_id.to_string(),
            is_ready,
            room,
        });
        Ok(())
    }

    fn require_host(&self, player_id: &str) -> Result<(), GameError> {
        let player = self.player(player_id).ok_or(GameError::StaleIntent)?;
        if !player.is_host {
            return Err(GameError::unauthorized("Only the host can do that"));
        }
        Ok(())
    }

    pub fn update_settings(
        &mut self,
        player_id: &str,
        settings: MafiaSettings,
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
    // Game start
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

        self.assign_roles();
        self.assign_anonymous_identities();
        self.status = RoomStatus::Playing;
        // Lobby lines carry real names and session ids
        self.chat.clear();
        self.mafia_chat.clear();
        self.day = 1;
        self.night_actions.clear();
        self.day_votes.clear();
        self.execution_votes.clear();
        self.skip_votes.clear();
        self.suspect_id = None;

        info!(
            room_id = %self.id,
            players = self.players.len(),
            "Mafia game started"
        );

        for player in &self.players {
            let role = player.role.unwrap_or(Role::Citizen);
            let teammates = if role == Role::Mafia {
                self.players
                    .iter()
                    .filter(|p| p.is_mafia() && p.id != player.id)
                    .map(|p| self.player_ref(p))
                    .collect()
            } else {
                Vec::new()
            };
            out.send_to(
                &player.id,
                ServerEvent::RoleAssigned {
                    role,
                    info: role.info(),
                    anonymous_number: player.anonymous_number.unwrap_or_default(),
                    seat_id: self.public_id(player),
                    teammates,
                },
            );
        }

        self.start_phase(Phase::Reveal, out);
        Ok(())
    }

    /// Deals the configured special roles over a uniform shuffle; the rest are citizens.
    fn assign_roles(&mut self) {
        let roles = self.settings.roles;
        let mut deck = Vec::with_capacity(self.players.len());
        deck.extend(std::iter::repeat(Role::Mafia).take(roles.mafia));
        deck.extend(std::iter::repeat(Role::Doctor).take(roles.doctor));
        deck.extend(std::iter::repeat(Role::Police).take(roles.police));

        let order = shuffled(&self.player_ids());
        for (index, id) in order.iter().enumerate() {
            let role = deck.get(index).copied().unwrap_or(Role::Citizen);
            if let Some(player) = self.player_mut(id) {
                player.role = Some(role);
                player.is_dead = false;
            }
        }
    }

    /// A random numbering of the table, plus a fresh seat handle per player
    fn assign_anonymous_identities(&mut self) {
        let numbers: Vec<u32> = (1..=self.players.len() as u32).collect();
        for (player, number) in self.players.iter_mut().zip(shuffled(&numbers)) {
            player.anonymous_number = Some(number);
            player.seat_id = Some(Uuid::new_v4().to_string());
        }
    }

    // ------------------------------------------------------------------
    // Phase transitions
    // ------------------------------------------------------------------

    /// Continues the game after the pending phase timer fired.
    pub fn on_timer(&mut self, out: &mut Outbox) {
        if self.status != RoomStatus::Playing {
            return;
        }
        let Some(phase) = self.phase else {
            return;
        };
        debug!(room_id = %self.id, phase = ?phase, "Phase timer expired");

        match phase {
            Phase::Reveal => self.start_phase(Phase::LobbyWait, out),
            Phase::LobbyWait | Phase::VoteResult | Phase::ExecutionResult => {
                self.start_phase(Phase::Night, out)
            }
            Phase::Night => self.resolve_night(out),
            Phase::NightResult => self.start_phase(Phase::Day, out),
            Phase::Day => self.resolve_day(out),
            Phase::FinalDefense => self.start_phase(Phase::ExecutionVote, out),
            Phase::ExecutionVote => self.resolve_execution(out),
        }
    }

    fn start_phase(&mut self, phase: Phase, out: &mut Outbox) {
        self.phase = Some(phase);
        match phase {
            Phase::Night => self.night_actions.clear(),
            Phase::Day => self.day_votes.clear(),
            Phase::ExecutionVote => self.execution_votes.clear(),
            _ => {}
        }
        self.skip_votes.clear();

        let duration = self.settings.phase_duration(phase);
        let day = self.day;
        let suspect = match phase {
            Phase::FinalDefense | Phase::ExecutionVote => {
                self.suspect_id.as_deref().and_then(|id| self.ref_by_id(id))
            }
            _ => None,
        };

        info!(room_id = %self.id, phase = ?phase, day, "Phase started");
        self.broadcast_snapshot(out, |room| ServerEvent::PhaseChanged {
            phase,
            day,
            duration_secs: duration.as_secs(),
            suspect: suspect.clone(),
            room,
        });
        out.schedule(duration);

        if phase == Phase::Night && self.night_complete() {
            self.resolve_night(out);
        }
    }

    fn require_phase(&self, phase: Phase, message: &str) -> Result<(), GameError> {
        if self.status != RoomStatus::Playing || self.phase != Some(phase) {
            return Err(GameError::unauthorized(message));
        }
        Ok(())
    }

    fn living_actor(&self, player_id: &str) -> Result<&Player, GameError> {
        let player = self.player(player_id).ok_or(GameError::StaleIntent)?;
        if player.is_dead {
            return Err(GameError::unauthorized("Dead players cannot act"));
        }
        Ok(player)
    }

    /// Resolves the handle a client named as a target
    fn living_target(&self, handle: &str) -> Result<&Player, GameError> {
        self.find_by_handle(handle)
            .filter(|p| p.is_alive())
            .ok_or_else(|| GameError::validation("Target must be a living player"))
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Public chat, except at night when only the mafia may talk, privately.
    pub fn chat(&mut self, player_id: &str, body: &str, out: &mut Outbox) -> Result<(), GameError> {
        let body = validate_body(body)?;
        let player = self.player(player_id).ok_or(GameError::StaleIntent)?;
        let (is_dead, is_mafia) = (player.is_dead, player.is_mafia());
        let display_name = self.display_name(player);
        let author_id = self.public_id(player);
        let in_play = self.status == RoomStatus::Playing;

        if in_play && is_dead {
            return Err(GameError::unauthorized("Dead players cannot chat"));
        }

        if in_play && self.phase == Some(Phase::Night) {
            if !is_mafia {
                return Err(GameError::unauthorized("Only the mafia can talk at night"));
            }
            let message = self
                .mafia_chat
                .push(&author_id, display_name, body, ChatChannel::Mafia);
            let recipients = self
                .players
                .iter()
                .filter(|p| p.is_mafia())
                .map(|p| p.id.clone())
                .collect();
            debug!(room_id = %self.id, "Mafia chat message");
            out.send_to_many(recipients, ServerEvent::ChatMessage(message));
        } else {
            let message = self
                .chat
                .push(&author_id, display_name, body, ChatChannel::Public);
            self.broadcast(out, ServerEvent::ChatMessage(message));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Night
    // ------------------------------------------------------------------

    /// Records (or replaces) the actor's action for tonight.
    pub fn night_action(
        &mut self,
        player_id: &str,
        kind: NightActionKind,
        target_id: &str,
        out: &mut Outbox,
    ) -> Result<(), GameError> {
        self.require_phase(Phase::Night, "Night actions are only allowed at night")?;
        let actor = self.living_actor(player_id)?;
        if actor.role.and_then(|r| r.night_action()) != Some(kind) {
            return Err(GameError::unauthorized(format!(
                "Your role cannot {} at night",
                kind
            )));
        }
        let target_player = self.living_target(target_id)?;
        let target = self.player_ref(target_player);
        let target_id = target_player.id.clone();

        self.night_actions
            .insert(player_id.to_string(), NightAction { kind, target_id });
        out.send_to(
            player_id,
            ServerEvent::NightActionRecorded {
                action: kind,
                target,
            },
        );

        if self.night_complete() {
            self.resolve_night(out);
        }
        Ok(())
    }

    /// Every living player with a night role has acted, or only one player is left.
    fn night_complete(&self) -> bool {
        if self.living_count() == 1 {
            return true;
        }
        self.living_players()
            .filter(|p| p.role.is_some_and(|r| r.acts_at_night()))
            .all(|p| self.night_actions.contains_key(&p.id))
    }

    fn resolve_night(&mut self, out: &mut Outbox) {
        if self.phase != Some(Phase::Night) {
            return;
        }
        self.phase = Some(Phase::NightResult);
        let actions = std::mem::take(&mut self.night_actions);

        let kill_votes: Vec<&String> = actions
            .iter()
            .filter(|(actor, action)| {
                action.kind == NightActionKind::Kill
                    && self.has_living_role(actor, Role::Mafia)
                    && self.is_living(&action.target_id)
            })
            .map(|(_, action)| &action.target_id)
            .collect();
        let kill_target = plurality(&count(kill_votes), self.settings.tie_break).map(|(id, _)| id);

        // Every doctor's protection holds, regardless of submission order
        let protected: HashSet<&String> = actions
            .iter()
            .filter(|(actor, action)| {
                action.kind == NightActionKind::Save && self.has_living_role(actor, Role::Doctor)
            })
            .map(|(_, action)| &action.target_id)
            .collect();

        let investigations: Vec<(String, PlayerRef, bool)> = actions
            .iter()
            .filter(|(actor, action)| {
                action.kind == NightActionKind::Investigate
                    && self.has_living_role(actor, Role::Police)
            })
            .filter_map(|(actor, action)| {
                self.player(&action.target_id)
                    .map(|target| (actor.clone(), self.player_ref(target), target.is_mafia()))
            })
            .collect();

        let mut killed = None;
        let mut saved = false;
        match kill_target {
            Some(target) if protected.contains(&target) => saved = true,
            Some(target) => {
                if let Some(victim) = self.player_mut(&target) {
                    victim.is_dead = true;
                    killed = Some(target);
                }
            }
            None => {}
        }
        self.skip_votes.clear();

        info!(
            room_id = %self.id,
            day = self.day,
            killed = ?killed,
            saved,
            "Night resolved"
        );

        let killed_ref = killed.as_deref().and_then(|id| self.ref_by_id(id));
        self.broadcast_snapshot(out, |room| ServerEvent::NightResults {
            killed: killed_ref.clone(),
            saved,
            room,
        });
        for (investigator, target, is_mafia) in investigations {
            out.send_to(
                &investigator,
                ServerEvent::InvestigationResult { target, is_mafia },
            );
        }

        if self.check_win(out) {
            return;
        }
        out.schedule(NIGHT_RESULT_DELAY);
    }

    // ------------------------------------------------------------------
    // Day
    // ------------------------------------------------------------------

    /// Records (or replaces) the voter's choice of suspect.
    pub fn day_vote(&mut self, voter_id: &str, target_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        self.require_phase(Phase::Day, "Voting is only allowed during the day")?;
        self.living_actor(voter_id)?;
        let target_id = self.living_target(target_id)?.id.clone();

        self.day_votes.insert(voter_id.to_string(), target_id);
        let votes = self.vote_counts(&self.day_tally());
        self.broadcast(out, ServerEvent::VoteStatus { votes });

        if self.all_living_voted(&self.day_votes) {
            self.resolve_day(out);
        }
        Ok(())
    }

    /// Votes from living voters for living targets, per target
    fn day_tally(&self) -> HashMap<String, usize> {
        count(
            self.day_votes
                .iter()
                .filter(|(voter, target)| self.is_living(voter) && self.is_living(target))
                .map(|(_, target)| target),
        )
    }

    fn vote_counts(&self, tally: &HashMap<String, usize>) -> Vec<VoteCount> {
        let mut votes: Vec<VoteCount> = tally
            .iter()
            .filter_map(|(target, votes)| {
                self.ref_by_id(target).map(|target| VoteCount {
                    target,
                    votes: *votes,
                })
            })
            .collect();
        votes.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(a.target.anonymous_number.cmp(&b.target.anonymous_number))
        });
        votes
    }

    fn resolve_day(&mut self, out: &mut Outbox) {
        if self.phase != Some(Phase::Day) {
            return;
        }
        self.phase = Some(Phase::VoteResult);

        let tally = self.day_tally();
        let votes = self.vote_counts(&tally);
        let living = self.living_count();
        let quorum = self.settings.day_vote_quorum;
        let suspect = plurality(&tally, self.settings.tie_break)
            .filter(|(_, count)| quorum.is_met(*count, living))
            .map(|(id, _)| id);
        self.day_votes.clear();
        self.skip_votes.clear();

        info!(
            room_id = %self.id,
            day = self.day,
            suspect = ?suspect,
            "Day vote resolved"
        );
        self.broadcast(
            out,
            ServerEvent::VoteResolved {
                suspect: suspect.as_deref().and_then(|id| self.ref_by_id(id)),
                votes,
            },
        );

        match suspect {
            Some(id) => {
                self.suspect_id = Some(id);
                self.start_phase(Phase::FinalDefense, out);
            }
            None => {
                self.day += 1;
                out.schedule(VOTE_RESULT_DELAY);
            }
        }
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    pub fn execution_vote(
        &mut self,
        voter_id: &str,
        choice: ExecutionChoice,
        out: &mut Outbox,
    ) -> Result<(), GameError> {
        self.require_phase(
            Phase::ExecutionVote,
            "Execution votes are only allowed during the execution vote",
        )?;
        self.living_actor(voter_id)?;

        self.execution_votes.insert(voter_id.to_string(), choice);
        let (kill_votes, live_votes) = self.execution_counts();
        self.broadcast(
            out,
            ServerEvent::ExecutionVoteStatus {
                kill_votes,
                live_votes,
            },
        );

        if self.all_living_voted(&self.execution_votes) {
            self.resolve_execution(out);
        }
        Ok(())
    }

    fn execution_counts(&self) -> (usize, usize) {
        self.execution_votes
            .iter()
            .filter(|(voter, _)| self.is_living(voter))
            .fold((0, 0), |(kill, live), (_, choice)| match choice {
                ExecutionChoice::Kill => (kill + 1, live),
                ExecutionChoice::Live => (kill, live + 1),
            })
    }

    /// More kill than live votes executes the suspect; a tie spares them.
    fn resolve_execution(&mut self, out: &mut Outbox) {
        if self.phase != Some(Phase::ExecutionVote) {
            return;
        }
        self.phase = Some(Phase::ExecutionResult);

        let (kill_votes, live_votes) = self.execution_counts();
        self.execution_votes.clear();
        self.skip_votes.clear();
        let suspect_id = self.suspect_id.take();
        let suspect_id = suspect_id.filter(|id| self.is_living(id));

        let executed = kill_votes > live_votes && suspect_id.is_some();
        if executed {
            if let Some(suspect) = suspect_id.as_deref().and_then(|id| self.player_mut(id)) {
                suspect.is_dead = true;
            }
        }

        let (player, role) = match suspect_id.as_deref().and_then(|id| self.player(id)) {
            Some(suspect) => (
                Some(self.player_ref(suspect)),
                if executed { suspect.role } else { None },
            ),
            None => (None, None),
        };

        info!(
            room_id = %self.id,
            day = self.day,
            executed,
            kill_votes,
            live_votes,
            "Execution vote resolved"
        );
        self.broadcast_snapshot(out, |room| ServerEvent::ExecutionResult {
            executed,
            player: player.clone(),
            role,
            kill_votes,
            live_votes,
            room,
        });

        if self.check_win(out) {
            return;
        }
        self.day += 1;
        out.schedule(EXECUTION_RESULT_DELAY);
    }

    // ------------------------------------------------------------------
    // Skip
    // ------------------------------------------------------------------

    pub fn skip_votes_needed(&self) -> usize {
        self.living_count() / 2 + 1
    }

    /// Votes to end the current day or night early; a majority of the living
    /// resolves the phase immediately with whatever has been submitted.
    pub fn skip_vote(&mut self, voter_id: &str, out: &mut Outbox) -> Result<(), GameError> {
        let phase = match self.phase {
            Some(phase @ (Phase::Day | Phase::Night)) if self.status == RoomStatus::Playing => {
                phase
            }
            _ => {
                return Err(GameError::unauthorized(
                    "Time can only be skipped during the day or night",
                ))
            }
        };
        self.living_actor(voter_id)?;

        self.skip_votes.insert(voter_id.to_string());
        let current_votes = self.skip_count();
        let votes_needed = self.skip_votes_needed();
        self.broadcast(
            out,
            ServerEvent::SkipVoteStatus {
                current_votes,
                votes_needed,
            },
        );

        if current_votes >= votes_needed {
            self.skip_phase(phase, out);
        }
        Ok(())
    }

    fn skip_count(&self) -> usize {
        self.skip_votes
            .iter()
            .filter(|id| self.is_living(id))
            .count()
    }

    fn skip_phase(&mut self, phase: Phase, out: &mut Outbox) {
        info!(room_id = %self.id, phase = ?phase, "Phase skipped by vote");
        self.broadcast(out, ServerEvent::TimeSkipped { phase });
        match phase {
            Phase::Night => self.resolve_night(out),
            _ => self.resolve_day(out),
        }
    }

    // ------------------------------------------------------------------
    // Win condition
    // ------------------------------------------------------------------

    /// Mafia gone: citizens win. Mafia at least as many as everyone else: mafia win.
    pub fn winner(&self) -> Option<(Team, &'static str)> {
        let living_mafia = self.living_players().filter(|p| p.is_mafia()).count();
        let others = self.living_count() - living_mafia;
        if living_mafia == 0 {
            Some((Team::Citizen, "All mafia have been eliminated"))
        } else if living_mafia >= others {
            Some((Team::Mafia, "The mafia now equal or outnumber the citizens"))
        } else {
            None
        }
    }

    fn check_win(&mut self, out: &mut Outbox) -> bool {
        let Some((winner, reason)) = self.winner() else {
            return false;
        };
        self.status = RoomStatus::Finished;
        out.cancel_timer();

        info!(room_id = %self.id, winner = %winner, day = self.day, "Mafia game over");
        self.broadcast_snapshot(out, |room| ServerEvent::GameOver {
            winner,
            reason: reason.to_string(),
            room,
        });
        true
    }
}
