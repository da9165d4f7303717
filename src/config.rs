use std::str::FromStr;
use tracing::warn;

use crate::game::DEFAULT_CHAT_HISTORY;

/// Process-level configuration read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Origin allowed by CORS
    pub client_url: String,
    pub chat_history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            client_url: "http://localhost:5173".to_string(),
            chat_history_limit: DEFAULT_CHAT_HISTORY,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "PORT", defaults.port),
            client_url: lookup("CLIENT_URL").unwrap_or(defaults.client_url),
            chat_history_limit: parse_or(&lookup, "CHAT_HISTORY_LIMIT", defaults.chat_history_limit)
                .max(1),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %raw, "Ignoring unparseable config value");
            default
        }),
        None => default,
    }
}
