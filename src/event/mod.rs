// Outbound events and the collector rooms write them into

// Public API - what other modules can use
pub use events::{PlayerRef, RoomSnapshot, ServerEvent, VoteCount};
pub use outbox::{Delivery, Outbox, TimerCommand};

// Internal modules
mod events;
mod outbox;
