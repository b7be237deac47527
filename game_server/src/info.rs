use std::time::Duration;

/// How a host should query a running server, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMethod {
    None,
    A2S,
}

/// Values a host fills a fresh `ServerConfig` with.
#[derive(Debug, Clone, Copy)]
pub struct GameDefaults {
    pub port: u16,
    pub query_port: u16,
    pub map: &'static str,
    pub max_players: u32,
    pub additional: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// How long `start` waits after spawning before handing the process back.
    pub startup_grace: Duration,
    /// How long `stop` waits for the process to exit after interrupting it.
    pub stop_wait: Duration,
    /// Extra delay after the stop wait, exited or not.
    pub stop_settle: Duration,
}

impl Timings {
    pub const fn immediate() -> Timings {
        Timings {
            startup_grace: Duration::ZERO,
            stop_wait: Duration::from_secs(5),
            stop_settle: Duration::ZERO,
        }
    }
}

/// Static description of a supported game title.
#[derive(Debug, Clone, Copy)]
pub struct GameInfo {
    pub id: &'static str,
    pub full_name: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub url: &'static str,
    pub color: &'static str,

    pub app_id: &'static str,
    pub login_anonymous: bool,

    /// Executable path relative to the server files directory, `/` separated.
    pub start_path: &'static str,
    /// File whose presence marks a directory as an importable install.
    pub import_marker: &'static str,

    pub allows_embed_console: bool,
    pub port_increments: u16,
    pub query_method: QueryMethod,
    pub defaults: GameDefaults,
    pub timings: Timings,
}

impl GameInfo {
    /// Last component of `start_path`, used in user-facing errors.
    pub fn exe_name(&self) -> &'static str {
        self.start_path
            .rsplit('/')
            .next()
            .unwrap_or(self.start_path)
    }
}
