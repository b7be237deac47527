//! Test doubles for crates building on `game_server`.

use std::{process::ExitStatus, sync::Mutex};

use async_trait::async_trait;

use crate::{SteamCmdError, UpdateAgent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub server_id: String,
    pub app_id: String,
    pub validate: bool,
    pub custom: Option<String>,
    pub login_anonymous: bool,
}

/// An `UpdateAgent` that records calls instead of running SteamCMD.
#[derive(Debug, Default)]
pub struct FakeAgent {
    pub calls: Mutex<Vec<UpdateCall>>,
    pub update_error: Option<String>,
    pub local_build: Option<String>,
    pub remote_build: Option<String>,
}

impl FakeAgent {
    pub fn failing(error: &str) -> FakeAgent {
        FakeAgent {
            update_error: Some(String::from(error)),
            ..FakeAgent::default()
        }
    }

    pub fn with_builds(local: &str, remote: &str) -> FakeAgent {
        FakeAgent {
            local_build: Some(String::from(local)),
            remote_build: Some(String::from(remote)),
            ..FakeAgent::default()
        }
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn success_status() -> ExitStatus {
    #[cfg(unix)]
    use std::os::unix::process::ExitStatusExt;
    #[cfg(windows)]
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(0)
}

#[async_trait]
impl UpdateAgent for FakeAgent {
    async fn update_and_wait(
        &self,
        server_id: &str,
        app_id: &str,
        validate: bool,
        custom: Option<&str>,
        login_anonymous: bool,
    ) -> Result<ExitStatus, SteamCmdError> {
        self.calls.lock().unwrap().push(UpdateCall {
            server_id: String::from(server_id),
            app_id: String::from(app_id),
            validate,
            custom: custom.map(String::from),
            login_anonymous,
        });

        match &self.update_error {
            Some(error) => Err(SteamCmdError::Reported(error.clone())),
            None => Ok(success_status()),
        }
    }

    async fn local_build_version(
        &self,
        _server_id: &str,
        app_id: &str,
    ) -> Result<String, SteamCmdError> {
        self.local_build
            .clone()
            .ok_or_else(|| SteamCmdError::NoBuildId(String::from(app_id)))
    }

    async fn remote_build_version(&self, app_id: &str) -> Result<String, SteamCmdError> {
        self.remote_build
            .clone()
            .ok_or_else(|| SteamCmdError::NoBuildId(String::from(app_id)))
    }
}
