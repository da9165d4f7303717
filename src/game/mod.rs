// Public API
pub use chat::{
    validate_body, validate_name, ChatChannel, ChatLog, ChatMessage, DEFAULT_CHAT_HISTORY,
};
pub use shuffle::{pick, shuffled, shuffled_with};
pub use tally::{count, plurality, TieBreak};

// Internal modules
mod chat;
mod shuffle;
mod tally;
