use serde::{Deserialize, Serialize};

use crate::GameDefaults;

/// Launch settings the host keeps for one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_id: String,
    #[serde(default)]
    pub map: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub query_port: Option<u16>,
    #[serde(default)]
    pub max_players: Option<u32>,
    #[serde(default)]
    pub params: String,
}

impl ServerConfig {
    pub fn new(server_id: &str) -> ServerConfig {
        ServerConfig {
            server_id: String::from(server_id),
            map: String::new(),
            port: None,
            query_port: None,
            max_players: None,
            params: String::new(),
        }
    }

    pub fn from_defaults(server_id: &str, defaults: &GameDefaults) -> ServerConfig {
        ServerConfig {
            server_id: String::from(server_id),
            map: String::from(defaults.map),
            port: Some(defaults.port),
            query_port: Some(defaults.query_port),
            max_players: Some(defaults.max_players),
            params: String::from(defaults.additional),
        }
    }

    /// Map name, or `None` when blank.
    pub fn map(&self) -> Option<&str> {
        Some(self.map.trim()).filter(|map| !map.is_empty())
    }

    /// Extra parameters split into individual arguments.
    pub fn extra_args(&self) -> impl Iterator<Item = &str> {
        self.params.split_whitespace()
    }
}
