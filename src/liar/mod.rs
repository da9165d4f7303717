// Liar variant: turn statements, free discussion, a vote and the keyword guess

// Public API - what other modules can use
pub use models::{LiarPhase, LiarPlayer, LiarSettings, LiarWinner, LIAR_MIN_PLAYERS};
pub use room::{LiarPlayerView, LiarRoom, LiarRoomView};

// Internal modules
mod models;
mod room;
