use std::{
    fs,
    path::{Path, PathBuf},
};

use game_server::ServerConfig;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("server ids must be unique, {0} appears more than once")]
    DuplicateServer(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    pub game: String,
    #[serde(flatten)]
    pub config: ServerConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub servers_root: PathBuf,
    pub steamcmd_path: PathBuf,
    #[serde(default)]
    pub steam_username: Option<String>,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl ManagerConfig {
    pub fn load(path: &Path) -> Result<ManagerConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = ManagerConfig::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.check_unique_ids()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<ManagerConfig, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn check_unique_ids(&self) -> Result<(), ConfigError> {
        for (idx, entry) in self.servers.iter().enumerate() {
            let id = &entry.config.server_id;
            if self.servers[..idx].iter().any(|e| &e.config.server_id == id) {
                return Err(ConfigError::DuplicateServer(id.clone()));
            }
        }

        Ok(())
    }

    pub fn server(&self, server_id: &str) -> Option<&ServerEntry> {
        self.servers
            .iter()
            .find(|entry| entry.config.server_id == server_id)
    }
}
