#![allow(dead_code)]

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use mafia_server::MessageHandler;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw frame through the WebSocket receive path
    pub async fn send(&self, player: &str, frame: Value) {
        self.input_handler
            .handle_message(player, frame.to_string())
            .await;
    }

    /// Send a room-scoped intent addressed to the setup's room
    pub async fn send_scoped(&self, player: &str, intent_type: &str, mut payload: Value) {
        payload["room_id"] = json!(self.room_id);
        self.send(player, json!({ "type": intent_type, "payload": payload }))
            .await;
    }

    /// Let phase timers run by moving the paused clock forward
    pub async fn advance(&self, secs: u64) {
        sleep(Duration::from_secs(secs)).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&self, player: &str, room_id: &str) {
        self.send(
            player,
            json!({
                "type": "JOIN_ROOM",
                "payload": { "room_id": room_id, "player_name": player },
            }),
        )
        .await;
    }

    pub async fn send_leave(&self, player: &str) {
        self.send(player, json!({ "type": "LEAVE" })).await;
    }

    pub async fn send_start_game(&self, player: &str) {
        self.send_scoped(player, "START_GAME", json!({})).await;
    }

    pub async fn send_chat(&self, player: &str, body: &str) {
        self.send_scoped(player, "CHAT", json!({ "body": body })).await;
    }

    pub async fn send_night_action(&self, player: &str, action: &str, target: &str) {
        self.send_scoped(
            player,
            "NIGHT_ACTION",
            json!({ "action": action, "target_id": target }),
        )
        .await;
    }

    pub async fn send_day_vote(&self, player: &str, target: &str) {
        self.send_scoped(player, "DAY_VOTE", json!({ "target_id": target }))
            .await;
    }

    pub async fn send_execution_vote(&self, player: &str, choice: &str) {
        self.send_scoped(player, "EXECUTION_VOTE", json!({ "choice": choice }))
            .await;
    }

    pub async fn send_skip_vote(&self, player: &str) {
        self.send_scoped(player, "SKIP_VOTE", json!({})).await;
    }

    pub async fn send_turn_message(&self, player: &str, body: &str) {
        self.send_scoped(player, "TURN_MESSAGE", json!({ "body": body }))
            .await;
    }

    pub async fn send_free_message(&self, player: &str, body: &str) {
        self.send_scoped(player, "FREE_MESSAGE", json!({ "body": body }))
            .await;
    }

    pub async fn send_liar_vote(&self, player: &str, target: &str) {
        self.send_scoped(player, "LIAR_VOTE", json!({ "target_id": target }))
            .await;
    }

    pub async fn send_keyword_guess(&self, player: &str, guess: &str) {
        self.send_scoped(player, "KEYWORD_GUESS", json!({ "guess": guess }))
            .await;
    }
}
