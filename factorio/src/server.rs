use std::{path::Path, time::Duration};

use game_server::{
    GameDefaults, GameInfo, LaunchSpec, QueryMethod, ServerAdapter, ServerConfig, ServerSlot,
    SupportedGame, Timings,
};
use tracing::debug;

#[cfg(windows)]
const START_PATH: &str = "bin/x64/factorio.exe";
#[cfg(not(windows))]
const START_PATH: &str = "bin/x64/factorio";

const CONFIG_PATH: &str = "config/config.ini";
const SETTINGS_PATH: &str = "data/server-settings.json";

pub static INFO: GameInfo = GameInfo {
    id: "factorio",
    full_name: "Factorio Dedicated Server",
    author: "Q-min",
    description: "Plugin for Factorio (Dedicated Server).",
    version: "1.1",
    url: "https://github.com/quumin/WindowsGSM.Servers",
    color: "#f9b234",
    app_id: "427520",
    // SteamCMD needs a real account (and SteamGuard) for this one.
    login_anonymous: false,
    start_path: START_PATH,
    import_marker: "PackageInfo.bin",
    allows_embed_console: true,
    port_increments: 1,
    query_method: QueryMethod::A2S,
    defaults: GameDefaults {
        port: 34197,
        query_port: 27001,
        map: "Default",
        max_players: 10,
        additional: "",
    },
    timings: Timings {
        startup_grace: Duration::from_secs(10),
        stop_wait: Duration::from_secs(5),
        stop_settle: Duration::from_millis(500),
    },
};

pub struct FactorioServer {
    slot: ServerSlot,
}

impl FactorioServer {
    pub fn new(slot: ServerSlot) -> FactorioServer {
        FactorioServer { slot }
    }
}

/// Save file a map name refers to, relative to the server files.
pub fn save_path(map: &str) -> String {
    format!("saves/{map}.zip")
}

impl ServerAdapter for FactorioServer {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn slot(&self) -> &ServerSlot {
        &self.slot
    }

    fn launch_spec(&self, config: &ServerConfig, program: &Path) -> LaunchSpec {
        let mut spec = LaunchSpec::new(program, self.slot.files_dir());

        match config.map().map(save_path) {
            Some(save) if self.slot.file(&save).is_file() => {
                spec.args(["--start-server".into(), save])
            }
            Some(save) => {
                debug!(server = %self.slot.server_id(), %save, "save not found, loading latest save");
                spec.arg("--start-server-load-latest")
            }
            None => {
                debug!(server = %self.slot.server_id(), "no map set, loading latest save");
                spec.arg("--start-server-load-latest")
            }
        };

        spec.arg(format!("--config={CONFIG_PATH}"))
            .args(["--server-settings", SETTINGS_PATH]);

        if let Some(port) = config.port {
            spec.args(["--port".into(), port.to_string()]);
        }

        spec.args(config.extra_args());
        spec
    }
}

impl SupportedGame for FactorioServer {
    fn game_info() -> &'static GameInfo {
        &INFO
    }

    fn build(slot: ServerSlot) -> Self {
        FactorioServer::new(slot)
    }
}
