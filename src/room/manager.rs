use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::event::{Delivery, Outbox, RoomSnapshot, ServerEvent, TimerCommand};
use crate::game::{validate_name, DEFAULT_CHAT_HISTORY};
use crate::shared::GameError;
use crate::websockets::{ClientIntent, ConnectionManager};

use super::game_room::GameRoom;
use super::timer::PhaseTimer;
use super::types::{GameSettings, RoomSummary};

struct RoomEntry {
    room: GameRoom,
    timer: PhaseTimer,
}

#[derive(Default)]
struct Registry {
    rooms: HashMap<String, RoomEntry>,
    /// player id -> room id
    player_rooms: HashMap<String, String>,
}

impl Registry {
    fn unused_room_id(&self) -> String {
        loop {
            let id = petname::Generator::generate_one(&petname::Petnames::default(), 2, "-")
                .expect("default word lists are non-empty");
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Owns every live room and routes player intents to them.
///
/// All room state sits behind one async mutex. An intent, a timer expiry and
/// the fan-out they produce run to completion while holding it, so a room
/// never observes two operations interleaved.
#[derive(Clone)]
pub struct GameManager {
    registry: Arc<Mutex<Registry>>,
    connections: Arc<dyn ConnectionManager>,
    chat_history: usize,
}

impl GameManager {
    pub fn new(connections: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            connections,
            chat_history: DEFAULT_CHAT_HISTORY,
        }
    }

    pub fn with_chat_history(mut self, limit: usize) -> Self {
        self.chat_history = limit.max(1);
        self
    }

    /// Entry point for every parsed client intent. Rejections are reported to
    /// the sender only; stale intents are dropped.
    #[instrument(skip(self, intent), fields(intent = intent.kind()))]
    pub async fn handle_intent(&self, player_id: &str, intent: ClientIntent) {
        let result = match intent {
            ClientIntent::CreateRoom {
                player_name,
                settings,
            } => self
                .create_room(player_id, &player_name, settings)
                .await
                .map(|_| ()),
            ClientIntent::JoinRoom {
                room_id,
                player_name,
            } => self.join_room(player_id, &room_id, &player_name).await,
            ClientIntent::ListRooms => {
                let rooms = self.list_rooms().await;
                self.send(player_id, &ServerEvent::RoomList { rooms }).await;
                Ok(())
            }
            ClientIntent::Leave => {
                self.leave(player_id).await;
                Ok(())
            }
            scoped => self.route_intent(player_id, scoped).await,
        };

        match result {
            Ok(()) => {}
            Err(GameError::StaleIntent) => {
                debug!(player_id = %player_id, "Dropped stale intent");
            }
            Err(err) => {
                debug!(player_id = %player_id, error = %err, "Intent rejected");
                self.send(player_id, &ServerEvent::error(&err)).await;
            }
        }
    }

    /// Creates a room with the player as host. A player already seated
    /// elsewhere leaves that room first.
    #[instrument(skip(self, settings))]
    pub async fn create_room(
        &self,
        player_id: &str,
        player_name: &str,
        settings: GameSettings,
    ) -> Result<String, GameError> {
        let name = validate_name(player_name)?;
        let mut registry = self.registry.lock().await;

        let room_id = registry.unused_room_id();
        let mut out = Outbox::new();
        let room = GameRoom::create(
            room_id.clone(),
            player_id,
            name,
            settings,
            self.chat_history,
            &mut out,
        )?;

        self.detach(&mut registry, player_id).await;
        info!(room_id = %room_id, game = ?room.kind(), "Room created");
        registry.rooms.insert(
            room_id.clone(),
            RoomEntry {
                room,
                timer: PhaseTimer::default(),
            },
        );
        registry
            .player_rooms
            .insert(player_id.to_string(), room_id.clone());
        self.flush(&mut registry, &room_id, out).await;
        Ok(room_id)
    }

    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        player_id: &str,
        room_id: &str,
        player_name: &str,
    ) -> Result<(), GameError> {
        let name = validate_name(player_name)?;
        let mut registry = self.registry.lock().await;

        if registry.player_rooms.get(player_id).map(String::as_str) == Some(room_id) {
            return Err(GameError::validation("Already in this room"));
        }
        let entry = registry
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::RoomNotFound(room_id.to_string()))?;

        let mut out = Outbox::new();
        entry.room.join(player_id, name, &mut out)?;
        info!(room_id = %room_id, "Player joined room");

        self.detach(&mut registry, player_id).await;
        registry
            .player_rooms
            .insert(player_id.to_string(), room_id.to_string());
        self.flush(&mut registry, room_id, out).await;
        Ok(())
    }

    /// Removes the player from their room, disposing of the room once empty.
    #[instrument(skip(self))]
    pub async fn leave(&self, player_id: &str) {
        let mut registry = self.registry.lock().await;
        self.detach(&mut registry, player_id).await;
    }

    /// Dispatches a room-scoped intent to the sender's current room.
    pub async fn route_intent(&self, player_id: &str, intent: ClientIntent) -> Result<(), GameError> {
        let mut registry = self.registry.lock().await;
        let room_id = registry
            .player_rooms
            .get(player_id)
            .cloned()
            .ok_or(GameError::StaleIntent)?;
        if intent.room_id() != Some(room_id.as_str()) {
            return Err(GameError::StaleIntent);
        }
        let entry = registry
            .rooms
            .get_mut(&room_id)
            .ok_or(GameError::StaleIntent)?;

        let mut out = Outbox::new();
        entry.room.apply(player_id, intent, &mut out)?;
        self.flush(&mut registry, &room_id, out).await;
        Ok(())
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<RoomSummary> = registry
            .rooms
            .values()
            .map(|entry| entry.room.summary())
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.rooms.len()
    }

    pub async fn room_of(&self, player_id: &str) -> Option<String> {
        self.registry
            .lock()
            .await
            .player_rooms
            .get(player_id)
            .cloned()
    }

    pub async fn snapshot(&self, room_id: &str, viewer_id: &str) -> Option<RoomSnapshot> {
        self.registry
            .lock()
            .await
            .rooms
            .get(room_id)
            .map(|entry| entry.room.snapshot_for(viewer_id))
    }

    async fn detach(&self, registry: &mut Registry, player_id: &str) {
        let Some(room_id) = registry.player_rooms.remove(player_id) else {
            return;
        };
        let Some(entry) = registry.rooms.get_mut(&room_id) else {
            return;
        };

        let mut out = Outbox::new();
        if entry.room.remove_player(player_id, &mut out) {
            info!(room_id = %room_id, player_id = %player_id, "Player left room");
        }
        if entry.room.is_empty() {
            if let Some(mut disposed) = registry.rooms.remove(&room_id) {
                disposed.timer.cancel();
            }
            info!(room_id = %room_id, "Room disposed");
        }
        self.flush(registry, &room_id, out).await;
    }

    /// Builds the future a phase timer runs when it expires
    fn fire_timer(&self, room_id: String, generation: u64) -> BoxFuture<'static, ()> {
        let manager = self.clone();
        Box::pin(async move { manager.on_timer(&room_id, generation).await })
    }

    async fn on_timer(&self, room_id: &str, generation: u64) {
        let mut registry = self.registry.lock().await;
        let Some(entry) = registry.rooms.get_mut(room_id) else {
            return;
        };
        if !entry.timer.disarm(generation) {
            debug!(room_id = %room_id, generation, "Ignoring superseded phase timer");
            return;
        }

        let mut out = Outbox::new();
        entry.room.on_timer(&mut out);
        self.flush(&mut registry, room_id, out).await;
    }

    /// Applies the room's timer request, then delivers its events.
    async fn flush(&self, registry: &mut Registry, room_id: &str, mut out: Outbox) {
        if let Some(command) = out.take_timer() {
            if let Some(entry) = registry.rooms.get_mut(room_id) {
                match command {
                    TimerCommand::Schedule(after) => {
                        let manager = self.clone();
                        let id = room_id.to_string();
                        entry
                            .timer
                            .arm(after, move |generation| manager.fire_timer(id, generation));
                    }
                    TimerCommand::Cancel => entry.timer.cancel(),
                }
            }
        }
        self.deliver(out.take_deliveries()).await;
    }

    async fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match serde_json::to_string(&delivery.event) {
                Ok(message) => {
                    self.connections
                        .send_to_players(&delivery.recipients, &message)
                        .await
                }
                Err(e) => warn!(
                    event = delivery.event.event_type(),
                    error = %e,
                    "Failed to serialize event"
                ),
            }
        }
    }

    async fn send(&self, player_id: &str, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(message) => self.connections.send_to_player(player_id, &message).await,
            Err(e) => warn!(
                event = event.event_type(),
                error = %e,
                "Failed to serialize event"
            ),
        }
    }
}
