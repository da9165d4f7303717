use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::shared::GameError;

pub const DEFAULT_CHAT_HISTORY: usize = 100;
pub const MAX_CHAT_BODY: usize = 500;
pub const MAX_NAME_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatChannel {
    Public,
    /// Night channel, delivered to the mafia team only
    Mafia,
    /// Liar game: message spoken on a player's turn
    Turn,
    /// Liar game: open discussion
    Free,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub author_id: String,
    pub display_name: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub channel: ChatChannel,
}

/// Bounded chat history. Oldest messages are discarded past `capacity`.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
    last_id: i64,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_HISTORY)
    }
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity.min(DEFAULT_CHAT_HISTORY)),
            capacity: capacity.max(1),
            last_id: 0,
        }
    }

    /// Appends a message and returns the stored copy.
    ///
    /// Ids are millisecond timestamps bumped when needed to stay strictly increasing.
    pub fn push(
        &mut self,
        author_id: &str,
        display_name: String,
        body: String,
        channel: ChatChannel,
    ) -> ChatMessage {
        let timestamp = Utc::now();
        let id = timestamp.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;

        let message = ChatMessage {
            id,
            author_id: author_id.to_string(),
            display_name,
            body,
            timestamp,
            channel,
        };

        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.clone());
        message
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops the history. Ids keep increasing from where they were.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Trims and checks a chat body.
pub fn validate_body(body: &str) -> Result<String, GameError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(GameError::Validation("Message cannot be empty".to_string()));
    }
    if body.chars().count() > MAX_CHAT_BODY {
        return Err(GameError::Validation(format!(
            "Message cannot exceed {} characters",
            MAX_CHAT_BODY
        )));
    }
    Ok(body.to_string())
}

/// Trims and checks a display name (1-12 characters).
pub fn validate_name(name: &str) -> Result<String, GameError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(GameError::Validation(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}
