use std::path::PathBuf;

/// Spawn-time OS failures, grouped the way a host reports them.
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("'{exe}' file not found: {message}")]
    NotFound { exe: String, message: String },

    #[error("Access to '{exe}' denied: {message}")]
    AccessDenied { exe: String, message: String },

    #[error("Unknown exception with '{exe}': {message}")]
    Unknown { exe: String, message: String },
}

impl LaunchError {
    pub fn from_io(exe: &str, err: &std::io::Error) -> LaunchError {
        let exe = String::from(exe);
        let message = err.to_string();

        match err.kind() {
            std::io::ErrorKind::NotFound => LaunchError::NotFound { exe, message },
            std::io::ErrorKind::PermissionDenied => LaunchError::AccessDenied { exe, message },
            _ => LaunchError::Unknown { exe, message },
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum IniError {
    #[error("couldn't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("couldn't write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SteamCmdError {
    #[error("SteamCMD not found ({})", .0.display())]
    Missing(PathBuf),

    #[error("Steam username not configured, {0} requires a Steam login")]
    LoginRequired(String),

    #[error("SteamCMD couldn't start: {0}")]
    Spawn(String),

    /// Whatever SteamCMD itself reported, untouched.
    #[error("{0}")]
    Reported(String),

    #[error("{} not found", .0.display())]
    ManifestMissing(PathBuf),

    #[error("no buildid for app {0}")]
    NoBuildId(String),

    #[error("malformed KeyValues text: {0}")]
    Vdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything a `ServerAdapter` can hand back to the host.
#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("{file_name} not found ({})", .path.display())]
    ExecutableMissing { file_name: String, path: PathBuf },

    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Update agent failure, passed through verbatim.
    #[error("{0}")]
    Update(String),

    #[error("Invalid Path! Fail to find {0}")]
    InvalidImport(String),

    /// Host setup is wrong, e.g. no SteamCMD or no Steam account for a title that needs one.
    #[error("{0}")]
    Config(String),

    /// Local or remote build lookup failed.
    #[error("{0}")]
    Build(String),

    #[error(transparent)]
    Ini(#[from] IniError),
}

impl AdapterError {
    pub fn build(err: SteamCmdError) -> AdapterError {
        match err {
            SteamCmdError::Missing(_) | SteamCmdError::LoginRequired(_) => err.into(),
            err => AdapterError::Build(err.to_string()),
        }
    }
}

impl From<SteamCmdError> for AdapterError {
    fn from(err: SteamCmdError) -> Self {
        match err {
            SteamCmdError::Missing(_) | SteamCmdError::LoginRequired(_) => {
                AdapterError::Config(err.to_string())
            }
            err => AdapterError::Update(err.to_string()),
        }
    }
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;
