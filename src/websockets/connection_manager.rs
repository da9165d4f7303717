use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Outbound hub for serialized server frames.
///
/// Each socket registers under the session id minted when it connected, and
/// that id is also the player's id inside a room. Rooms never talk to sockets
/// directly: the `GameManager` flushes a room's outbox here after every
/// mutation, so a frame is either addressed to one session or fanned out to
/// the session ids the room chose. A session whose socket has closed silently
/// misses the frame; its seat is released by `GameManager::leave`.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, player_id: String, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, player_id: &str);

    /// Private delivery, e.g. a role reveal
    async fn send_to_player(&self, player_id: &str, message: &str);

    /// Room fan-out in the order given; absent sessions are skipped
    async fn send_to_players(&self, player_ids: &[String], message: &str);
}

pub struct InMemoryConnectionManager {
    // session id -> sender of the socket task's write half
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, player_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(player_id, sender);
    }

    async fn remove_connection(&self, player_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(player_id);
    }

    async fn send_to_player(&self, player_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(player_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_players(&self, player_ids: &[String], message: &str) {
        let connections = self.connections.read().await;
        for player_id in player_ids {
            if let Some(sender) = connections.get(player_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}
