use std::{path::Path, time::Duration};

use game_server::{
    ini::{self, IniOutcome},
    GameDefaults, GameInfo, LaunchSpec, QueryMethod, Result, ServerAdapter, ServerConfig,
    ServerSlot, SupportedGame, Timings,
};
use tracing::info;

#[cfg(windows)]
const START_PATH: &str = "Engine/Binaries/Win64/FactoryServer-Win64-Shipping-Cmd.exe";
#[cfg(not(windows))]
const START_PATH: &str = "Engine/Binaries/Linux/FactoryServer-Linux-Shipping";

#[cfg(windows)]
pub const GAME_INI_PATH: &str = "FactoryGame/Saved/Config/WindowsServer/Game.ini";
#[cfg(not(windows))]
pub const GAME_INI_PATH: &str = "FactoryGame/Saved/Config/LinuxServer/Game.ini";

pub const GAME_INI_MISSING: &str = "Game.ini file not found!";

pub static INFO: GameInfo = GameInfo {
    id: "satisfactory",
    full_name: "Satisfactory Dedicated Server",
    author: "Q-min",
    description: "Plugin for Satisfactory (Dedicated Server).",
    version: "1.1",
    url: "https://github.com/quumin/WindowsGSM.Satisfactory/tree/main",
    color: "#f9b234",
    app_id: "1690800",
    login_anonymous: true,
    start_path: START_PATH,
    import_marker: START_PATH,
    allows_embed_console: true,
    port_increments: 1,
    query_method: QueryMethod::A2S,
    // Since 1.0 the query port is the game port.
    defaults: GameDefaults {
        port: 7777,
        query_port: 7777,
        map: "Dedicated",
        max_players: 4,
        additional: "",
    },
    timings: Timings {
        startup_grace: Duration::ZERO,
        stop_wait: Duration::from_secs(20),
        stop_settle: Duration::ZERO,
    },
};

pub struct SatisfactoryServer {
    slot: ServerSlot,
}

impl SatisfactoryServer {
    pub fn new(slot: ServerSlot) -> SatisfactoryServer {
        SatisfactoryServer { slot }
    }

    /// Push the configured player cap into `Game.ini`.
    ///
    /// The server sometimes ignores `-MaxPlayers` unless the ini agrees.
    pub fn update_max_players(&self, max_players: u32) -> Result<Option<String>> {
        let path = self.slot.file(GAME_INI_PATH);

        match ini::update_max_players_file(&path, max_players)? {
            IniOutcome::Written => {
                info!(server = %self.slot.server_id(), max_players, "Game.ini updated");
                Ok(None)
            }
            IniOutcome::Missing => Ok(Some(String::from(GAME_INI_MISSING))),
        }
    }
}

impl ServerAdapter for SatisfactoryServer {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn slot(&self) -> &ServerSlot {
        &self.slot
    }

    fn prepare(&self, config: &ServerConfig) -> Result<Option<String>> {
        match config.max_players {
            Some(max_players) => self.update_max_players(max_players),
            None => Ok(None),
        }
    }

    fn launch_spec(&self, config: &ServerConfig, program: &Path) -> LaunchSpec {
        let mut spec = LaunchSpec::new(program, self.slot.files_dir());

        spec.args(["FactoryGame", "-unattended"])
            .args(config.extra_args());

        if let Some(port) = config.port {
            spec.arg(format!("-Port={port}"));
        }
        if let Some(max_players) = config.max_players {
            spec.arg(format!("-MaxPlayers={max_players}"));
        }

        spec
    }
}

impl SupportedGame for SatisfactoryServer {
    fn game_info() -> &'static GameInfo {
        &INFO
    }

    fn build(slot: ServerSlot) -> Self {
        SatisfactoryServer::new(slot)
    }
}
