use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::room::GameManager;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_manager: GameManager,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, config: ServerConfig) -> Self {
        let game_manager = GameManager::new(Arc::clone(&connection_manager))
            .with_chat_history(config.chat_history_limit);
        Self {
            game_manager,
            connection_manager,
            config: Arc::new(config),
        }
    }
}

/// Errors raised by game intents.
///
/// Everything except `StaleIntent` is reported back to the player who sent the
/// intent; no state has been changed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Not allowed: {0}")]
    Unauthorized(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Game has already started")]
    GameAlreadyStarted,

    #[error("Room is full")]
    RoomFull,

    #[error("Intent no longer applies")]
    StaleIntent,
}

impl GameError {
    /// Stable identifier sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION",
            GameError::Unauthorized(_) => "UNAUTHORIZED",
            GameError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::RoomFull => "ROOM_FULL",
            GameError::StaleIntent => "STALE_INTENT",
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        GameError::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        GameError::Validation(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::RoomNotFound(id) => AppError::NotFound(format!("Room {}", id)),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
