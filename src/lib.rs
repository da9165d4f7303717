// Library crate for the Mafia / Liar game server
// This file exposes the public API for integration tests

pub mod catalog;
pub mod config;
pub mod event;
pub mod game;
pub mod liar;
pub mod mafia;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use event::{Outbox, ServerEvent};
pub use room::{GameManager, GameSettings};
pub use shared::{AppError, AppState, GameError};
pub use websockets::{
    ClientIntent, ConnectionManager, InMemoryConnectionManager, MessageHandler,
    WebsocketReceiveHandler,
};
