pub mod vdf;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::{io::BufReader, process::Command};
use tracing::{debug, info, warn};

use crate::{launch::read_line_lossy, server_files_dir, ConsoleSink, SteamCmdError, Stream};

/// External install/update subsystem the adapters delegate to.
#[async_trait]
pub trait UpdateAgent: Send + Sync {
    /// Install or update `app_id` for a server and wait for it to finish.
    async fn update_and_wait(
        &self,
        server_id: &str,
        app_id: &str,
        validate: bool,
        custom: Option<&str>,
        login_anonymous: bool,
    ) -> Result<ExitStatus, SteamCmdError>;

    async fn local_build_version(
        &self,
        server_id: &str,
        app_id: &str,
    ) -> Result<String, SteamCmdError>;

    async fn remote_build_version(&self, app_id: &str) -> Result<String, SteamCmdError>;
}

/// Drives a local `steamcmd` binary.
pub struct SteamCmd {
    executable: PathBuf,
    servers_root: PathBuf,
    username: Option<String>,
    console: Arc<dyn ConsoleSink>,
}

impl SteamCmd {
    pub fn new(
        executable: impl Into<PathBuf>,
        servers_root: impl Into<PathBuf>,
        console: Arc<dyn ConsoleSink>,
    ) -> SteamCmd {
        SteamCmd {
            executable: executable.into(),
            servers_root: servers_root.into(),
            username: None,
            console,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> SteamCmd {
        self.username = username.filter(|u| !u.trim().is_empty());
        self
    }

    fn login_args(&self, app_id: &str, anonymous: bool) -> Result<Vec<OsString>, SteamCmdError> {
        let user = match (anonymous, self.username.as_ref()) {
            (true, _) => "anonymous",
            (false, Some(user)) => user.as_str(),
            (false, None) => return Err(SteamCmdError::LoginRequired(String::from(app_id))),
        };

        Ok(vec!["+login".into(), user.into()])
    }

    /// Arguments for `app_update`, in the order SteamCMD expects them.
    pub fn update_args(
        &self,
        install_dir: &Path,
        app_id: &str,
        validate: bool,
        custom: Option<&str>,
        login_anonymous: bool,
    ) -> Result<Vec<OsString>, SteamCmdError> {
        let mut args: Vec<OsString> = vec!["+force_install_dir".into(), install_dir.into()];
        args.extend(self.login_args(app_id, login_anonymous)?);
        args.push("+app_update".into());
        args.push(app_id.into());

        if validate {
            args.push("validate".into());
        }
        if let Some(custom) = custom {
            args.extend(custom.split_whitespace().map(OsString::from));
        }

        args.push("+quit".into());
        Ok(args)
    }

    fn command(&self) -> Result<Command, SteamCmdError> {
        if !self.executable.is_file() {
            return Err(SteamCmdError::Missing(self.executable.clone()));
        }

        let mut command = Command::new(&self.executable);
        if let Some(dir) = self.executable.parent() {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());

        Ok(command)
    }
}

#[async_trait]
impl UpdateAgent for SteamCmd {
    async fn update_and_wait(
        &self,
        server_id: &str,
        app_id: &str,
        validate: bool,
        custom: Option<&str>,
        login_anonymous: bool,
    ) -> Result<ExitStatus, SteamCmdError> {
        let install_dir = server_files_dir(&self.servers_root, server_id);
        std::fs::create_dir_all(&install_dir)?;

        let args = self.update_args(&install_dir, app_id, validate, custom, login_anonymous)?;
        let mut command = self.command()?;
        command
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        info!(server = %server_id, app_id, validate, "updating via SteamCMD");
        let mut child = command
            .spawn()
            .map_err(|e| SteamCmdError::Spawn(e.to_string()))?;

        let mut last_error = None;
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                match read_line_lossy(&mut reader, &mut buf).await {
                    Ok(Some(line)) => {
                        if is_error_line(&line) {
                            last_error = Some(line.trim().to_string());
                        }
                        self.console.append(server_id, Stream::Stdout, line);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(server = %server_id, "lost SteamCMD output: {e}");
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        debug!(server = %server_id, %status, "SteamCMD exited");

        match (status.success(), last_error) {
            (true, _) => Ok(status),
            (false, Some(error)) => Err(SteamCmdError::Reported(error)),
            (false, None) => Err(SteamCmdError::Reported(format!(
                "SteamCMD exited with {status}"
            ))),
        }
    }

    async fn local_build_version(
        &self,
        server_id: &str,
        app_id: &str,
    ) -> Result<String, SteamCmdError> {
        let manifest = server_files_dir(&self.servers_root, server_id)
            .join("steamapps")
            .join(format!("appmanifest_{app_id}.acf"));

        let text = tokio::fs::read_to_string(&manifest)
            .await
            .map_err(|_| SteamCmdError::ManifestMissing(manifest.clone()))?;

        local_build_from_manifest(&text, app_id)
    }

    async fn remote_build_version(&self, app_id: &str) -> Result<String, SteamCmdError> {
        let output = self
            .command()?
            .args([
                "+login",
                "anonymous",
                "+app_info_update",
                "1",
                "+app_info_print",
                app_id,
                "+quit",
            ])
            .output()
            .await
            .map_err(|e| SteamCmdError::Spawn(e.to_string()))?;

        remote_build_from_app_info(&String::from_utf8_lossy(&output.stdout), app_id)
    }
}

fn is_error_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("Error!") || line.starts_with("ERROR!")
}

pub fn local_build_from_manifest(text: &str, app_id: &str) -> Result<String, SteamCmdError> {
    vdf::parse(text)?
        .get_str(&["AppState", "buildid"])
        .map(String::from)
        .ok_or_else(|| SteamCmdError::NoBuildId(String::from(app_id)))
}

pub fn remote_build_from_app_info(text: &str, app_id: &str) -> Result<String, SteamCmdError> {
    vdf::parse_from_key(text, app_id)?
        .get_str(&[app_id, "depots", "branches", "public", "buildid"])
        .map(String::from)
        .ok_or_else(|| SteamCmdError::NoBuildId(String::from(app_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferConsole;

    fn steamcmd(username: Option<&str>) -> SteamCmd {
        SteamCmd::new("/opt/steamcmd/steamcmd.sh", "/srv/servers", Arc::new(BufferConsole::new()))
            .with_username(username.map(String::from))
    }

    #[test]
    fn anonymous_update_args() {
        let args = steamcmd(None)
            .update_args(Path::new("/srv/servers/1/serverfiles"), "1690800", true, None, true)
            .unwrap();

        assert_eq!(
            args,
            [
                "+force_install_dir",
                "/srv/servers/1/serverfiles",
                "+login",
                "anonymous",
                "+app_update",
                "1690800",
                "validate",
                "+quit",
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn login_update_args_carry_custom_flags() {
        let args = steamcmd(Some("engineer"))
            .update_args(
                Path::new("/srv"),
                "427520",
                false,
                Some("-beta experimental"),
                false,
            )
            .unwrap();

        let args = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            args[2..],
            ["+login", "engineer", "+app_update", "427520", "-beta", "experimental", "+quit"]
        );
    }

    #[test]
    fn login_required_without_username() {
        let err = steamcmd(Some("  "))
            .update_args(Path::new("/srv"), "427520", false, None, false)
            .unwrap_err();

        assert!(matches!(err, SteamCmdError::LoginRequired(ref app) if app == "427520"));
    }

    #[test]
    fn reads_public_build_from_app_info() {
        let output = r#"AppID : 1690800, change number : 25107433/0
"1690800"
{
	"common"
	{
		"name"		"Satisfactory Dedicated Server"
	}
	"depots"
	{
		"branches"
		{
			"experimental"
			{
				"buildid"		"16500000"
			}
			"public"
			{
				"buildid"		"16287459"
				"timeupdated"		"1727704100"
			}
		}
	}
}
"#;

        assert_eq!(
            remote_build_from_app_info(output, "1690800").unwrap(),
            "16287459"
        );
        assert!(matches!(
            remote_build_from_app_info(output, "427520"),
            Err(SteamCmdError::Vdf(_))
        ));
    }

    #[test]
    fn manifest_without_buildid() {
        let err = local_build_from_manifest("\"AppState\" { \"appid\" \"1\" }", "1").unwrap_err();
        assert!(matches!(err, SteamCmdError::NoBuildId(_)));
    }

    #[test]
    fn error_lines_are_recognised() {
        assert!(is_error_line("Error! App '427520' state is 0x602 after update job."));
        assert!(is_error_line("ERROR! Timed out waiting for AppInfo update."));
        assert!(is_error_line("  Error! App '1690800' state is 0x6 after update job."));
        assert!(!is_error_line("Logging in user 'x' to Steam Public...FAILED (Invalid Password)"));
        assert!(!is_error_line("Success! App '1690800' fully installed."));
    }
}
