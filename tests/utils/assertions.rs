//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(String::as_str).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    pub fn for_player(setup: &'a TestSetup, player: &'a str) -> Self {
        Self::for_players(setup, vec![player])
    }

    /// Assert that every player's next frame has the given type (consumes it).
    /// Payloads may differ per player, so the first player's is returned.
    pub async fn received_message_type(self, expected_type: &str) -> MessageContent {
        self.received_each(expected_type)
            .await
            .into_iter()
            .next()
            .expect("at least one player to check")
    }

    /// Like `received_message_type`, but returns every player's payload in order
    pub async fn received_each(self, expected_type: &str) -> Vec<MessageContent> {
        let mut messages = vec![];

        for player in &self.players {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(player)
                .await
                .unwrap_or_else(|| panic!("{} should have received {}", player, expected_type));

            let frame: Value = serde_json::from_str(&message).unwrap();
            assert_eq!(
                frame["type"], expected_type,
                "{} received wrong message type: {}",
                player, frame
            );
            messages.push(MessageContent {
                payload: frame["payload"].clone(),
            });
        }

        messages
    }

    /// Assert that every player received the same broadcast (consumes it)
    pub async fn received_broadcast(self, expected_type: &str) -> MessageContent {
        let players = self.players.clone();
        let mut messages = self.received_each(expected_type).await;
        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                msg.payload, messages[0].payload,
                "Player {} payload differs from player {}",
                players[i], players[0]
            );
        }
        messages.remove(0)
    }

    /// Assert that players received no messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.setup.mock_conn_manager.get_messages_for(player).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Count how many messages of a specific type a player received (non-consuming)
    pub async fn count_message_type(&self, player: &str, msg_type: &str) -> usize {
        let messages = self.setup.mock_conn_manager.get_messages_for(player).await;
        messages
            .iter()
            .filter_map(|msg| serde_json::from_str::<Value>(msg).ok())
            .filter(|frame| frame["type"] == msg_type)
            .count()
    }

    /// Assert that players received a sequence of message types in order (consumes them)
    pub async fn received_message_sequence(self, expected_types: Vec<&str>) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            for (i, expected_type) in expected_types.iter().enumerate() {
                let message = self
                    .setup
                    .mock_conn_manager
                    .consume_message_for(player)
                    .await
                    .unwrap_or_else(|| {
                        panic!("{} ran out of messages before {} ({})", player, i, expected_type)
                    });
                let frame: Value = serde_json::from_str(&message)
                    .unwrap_or_else(|e| panic!("Failed to parse message {} for {}: {}", i, player, e));

                assert_eq!(
                    frame["type"], *expected_type,
                    "{} message {} has wrong type: {}",
                    player, i, frame
                );

                // Only collect messages from the first player to avoid duplicates
                if player == &self.players[0] {
                    result_messages.push(MessageContent {
                        payload: frame["payload"].clone(),
                    });
                }
            }
        }

        result_messages
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: Value,
}

impl MessageContent {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Assert a top-level payload field
    pub fn with_field(self, key: &str, expected: impl Into<Value>) -> Self {
        assert_eq!(self.payload[key], expected.into(), "payload: {}", self.payload);
        self
    }

    /// Assert the phase announced by a PHASE_CHANGED frame
    pub fn with_phase(self, expected_phase: &str) -> Self {
        self.with_field("phase", expected_phase)
    }

    /// Assert the error code of an ERROR frame
    pub fn with_code(self, expected_code: &str) -> Self {
        self.with_field("code", expected_code)
    }

    /// Assert the id inside a player reference field
    pub fn with_player_ref(self, key: &str, expected_id: &str) -> Self {
        assert_eq!(self.payload[key]["id"], expected_id, "payload: {}", self.payload);
        self
    }

    pub fn with_body(self, expected_body: &str) -> Self {
        self.with_field("body", expected_body)
    }
}
