use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event::ServerEvent;
use crate::room::GameManager;
use crate::shared::AppState;

use super::messages::ClientIntent;
use super::socket::{Connection, MessageHandler};

/// Parses inbound frames into intents and hands them to the game manager
pub struct WebsocketReceiveHandler {
    game_manager: GameManager,
}

impl WebsocketReceiveHandler {
    pub fn new(game_manager: GameManager) -> Self {
        Self { game_manager }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, player_id: &str, message: String) {
        match serde_json::from_str::<ClientIntent>(&message) {
            Ok(intent) => {
                debug!(
                    player_id = %player_id,
                    intent = intent.kind(),
                    "Received intent"
                );
                self.game_manager.handle_intent(player_id, intent).await;
            }
            Err(e) => {
                warn!(
                    player_id = %player_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
            }
        }
    }
}

/// GET /ws
///
/// Every connection is a fresh player session identified by a UUID.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let player_id = Uuid::new_v4().to_string();
    info!(player_id = %player_id, "WebSocket connection established");

    // Outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(player_id.clone(), outbound_sender.clone())
        .await;

    let connected = ServerEvent::Connected {
        session_id: player_id.clone(),
    };
    if let Ok(message) = serde_json::to_string(&connected) {
        let _ = outbound_sender.send(message);
    }
    drop(outbound_sender);

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.game_manager.clone(),
    ));
    let connection = Connection::new(
        player_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(player_id = %player_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                player_id = %player_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: stop routing frames to this session, then leave its room
    app_state
        .connection_manager
        .remove_connection(&player_id)
        .await;
    app_state.game_manager.leave(&player_id).await;

    info!(player_id = %player_id, "Player session ended");
}
