// Mafia variant: roles, night actions, day trial and win conditions

// Public API - what other modules can use
pub use models::{
    ExecutionChoice, MafiaSettings, NightAction, Phase, Player, VoteQuorum,
    EXECUTION_RESULT_DELAY, NIGHT_RESULT_DELAY, PLAYER_LIMIT, VOTE_RESULT_DELAY,
};
pub use room::MafiaRoom;
pub use views::{MafiaRoomView, PlayerView};

// Internal modules
mod models;
mod room;
mod views;
