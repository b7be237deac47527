use std::{
    path::{Path, PathBuf},
    process::ExitStatus,
};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    executable_present, AdapterError, GameInfo, LaunchSpec, ProcessHandle, Result, ServerConfig,
    ServerSlot, StopOutcome,
};

/// The operations a host drives a dedicated server through.
///
/// Titles only supply their metadata, their slot and how to build a
/// command line. Everything else has a shared default.
#[async_trait]
pub trait ServerAdapter: Send + Sync {
    fn info(&self) -> &'static GameInfo;

    fn slot(&self) -> &ServerSlot;

    /// Title-specific program arguments for one launch.
    fn launch_spec(&self, config: &ServerConfig, program: &Path) -> LaunchSpec;

    /// Runs right before spawning. A returned notice ends up on the handle.
    fn prepare(&self, _config: &ServerConfig) -> Result<Option<String>> {
        Ok(None)
    }

    fn exe_path(&self) -> PathBuf {
        self.slot().file(self.info().start_path)
    }

    async fn start(&self, config: &ServerConfig) -> Result<ProcessHandle> {
        let info = self.info();
        let slot = self.slot();
        let program = self.exe_path();

        if !executable_present(&program) {
            return Err(AdapterError::ExecutableMissing {
                file_name: String::from(info.exe_name()),
                path: program,
            });
        }

        let notice = self.prepare(config)?;
        if let Some(notice) = &notice {
            warn!(server = %slot.server_id(), "{notice}");
        }

        let mut spec = self.launch_spec(config, &program);
        spec.capture_output(info.allows_embed_console);

        let handle = spec.spawn(slot.server_id(), slot.console().clone())?;
        info!(
            server = %slot.server_id(),
            pid = ?handle.pid(),
            "{} started",
            info.full_name
        );

        let grace = slot.timings_or(info.timings).startup_grace;
        if !grace.is_zero() {
            tokio::time::sleep(grace).await;
        }

        Ok(handle.with_notice(notice))
    }

    async fn stop(&self, handle: ProcessHandle) -> StopOutcome {
        let timings = self.slot().timings_or(self.info().timings);
        info!(server = %handle.server_id(), "stopping {}", self.info().full_name);

        handle.stop(timings.stop_wait, timings.stop_settle).await
    }

    async fn update(&self, validate: bool, custom: Option<&str>) -> Result<ExitStatus> {
        let info = self.info();
        let slot = self.slot();

        let status = slot
            .agent()
            .update_and_wait(
                slot.server_id(),
                info.app_id,
                validate,
                custom,
                info.login_anonymous,
            )
            .await?;

        info!(server = %slot.server_id(), %status, "{} updated", info.full_name);
        Ok(status)
    }

    /// Neither supported title needs a generated config file.
    async fn create_config(&self) -> Result<()> {
        Ok(())
    }

    fn is_install_valid(&self) -> bool {
        executable_present(&self.exe_path())
    }

    /// Check that `path` looks like an existing install worth importing.
    fn is_import_valid(&self, path: &Path) -> Result<()> {
        let marker = self.info().import_marker;
        let found = marker
            .split('/')
            .fold(path.to_path_buf(), |path, part| path.join(part))
            .is_file();

        match found {
            true => Ok(()),
            false => Err(AdapterError::InvalidImport(String::from(
                marker.rsplit('/').next().unwrap_or(marker),
            ))),
        }
    }

    async fn local_build(&self) -> Result<String> {
        self.slot()
            .agent()
            .local_build_version(self.slot().server_id(), self.info().app_id)
            .await
            .map_err(AdapterError::build)
    }

    async fn remote_build(&self) -> Result<String> {
        self.slot()
            .agent()
            .remote_build_version(self.info().app_id)
            .await
            .map_err(AdapterError::build)
    }
}

/// A title a manager can register by type.
pub trait SupportedGame: ServerAdapter + Sized + 'static {
    fn game_info() -> &'static GameInfo;

    fn build(slot: ServerSlot) -> Self;
}
