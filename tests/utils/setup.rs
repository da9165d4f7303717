#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;

use mafia_server::{
    liar::LiarSettings, mafia::MafiaSettings, GameManager, GameSettings, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    pub game_manager: GameManager,
    /// Player ids double as display names; the first one hosts
    pub players: Vec<String>,
    pub room_id: String,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    settings: GameSettings,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            settings: GameSettings::default(),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn with_mafia_settings(mut self, settings: MafiaSettings) -> Self {
        self.settings = GameSettings::Mafia(settings);
        self
    }

    pub fn with_liar_settings(mut self, settings: LiarSettings) -> Self {
        self.settings = GameSettings::Liar(settings);
        self
    }

    pub fn liar(self) -> Self {
        self.with_liar_settings(LiarSettings::default())
    }

    /// Seats every player in one room through the public intents, then
    /// discards the lobby traffic so tests start from a clean inbox.
    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let game_manager = GameManager::new(mock_conn_manager.clone());
        let input_handler = WebsocketReceiveHandler::new(game_manager.clone());

        for player in &self.players {
            mock_conn_manager.add_connected_player(player).await;
        }

        let mut setup = TestSetup {
            mock_conn_manager,
            input_handler,
            game_manager,
            players: self.players,
            room_id: String::new(),
        };

        let Some(host) = setup.players.first().cloned() else {
            return setup;
        };
        setup
            .send(
                &host,
                json!({
                    "type": "CREATE_ROOM",
                    "payload": { "player_name": host, "settings": self.settings },
                }),
            )
            .await;
        setup.room_id = setup
            .game_manager
            .room_of(&host)
            .await
            .expect("host should be seated");

        let guests = setup.players[1..].to_vec();
        for guest in &guests {
            setup.send_join(guest, &setup.room_id).await;
        }
        setup.clear_messages().await;
        setup
    }
}
