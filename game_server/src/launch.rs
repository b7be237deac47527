use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
};
use tracing::{debug, warn};

use crate::{ConsoleSink, LaunchError, ProcessHandle, Stream};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Everything needed to spawn a server once, built fresh per start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub working_dir: PathBuf,
    pub args: Vec<OsString>,
    pub capture_output: bool,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> LaunchSpec {
        LaunchSpec {
            program: program.into(),
            working_dir: working_dir.into(),
            args: vec![],
            capture_output: false,
        }
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn capture_output(&mut self, capture: bool) -> &mut Self {
        self.capture_output = capture;
        self
    }

    /// Arguments joined into one line, as a host would display them.
    pub fn command_line(&self) -> String {
        self.args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn exe_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);

        command.current_dir(&self.working_dir).args(&self.args);

        if self.capture_output {
            command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        } else {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        command
    }

    /// Spawn the process, wiring captured output into `console`.
    pub fn spawn(
        &self,
        server_id: &str,
        console: Arc<dyn ConsoleSink>,
    ) -> Result<ProcessHandle, LaunchError> {
        debug!(
            server = %server_id,
            program = %self.program.display(),
            args = %self.command_line(),
            "spawning"
        );

        let exe = self.exe_name();
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| LaunchError::from_io(&exe, &e))?;

        if self.capture_output {
            if let Some(stdout) = child.stdout.take() {
                forward_lines(stdout, server_id, Stream::Stdout, console.clone());
            }
            if let Some(stderr) = child.stderr.take() {
                forward_lines(stderr, server_id, Stream::Stderr, console);
            }
        }

        Ok(ProcessHandle::new(server_id, &exe, child))
    }
}

fn forward_lines<R>(reader: R, server_id: &str, stream: Stream, console: Arc<dyn ConsoleSink>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let server_id = String::from(server_id);
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            match read_line_lossy(&mut reader, &mut buf).await {
                Ok(Some(line)) => console.append(&server_id, stream, line),
                Ok(None) => break,
                Err(e) => {
                    warn!(server = %server_id, %stream, "console capture stopped: {e}");
                    break;
                }
            }
        }
    });
}

/// Next `\n`-terminated line with invalid UTF-8 replaced, `None` at EOF.
pub(crate) async fn read_line_lossy<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// `true` when `path` exists and is a file.
pub fn executable_present(path: &Path) -> bool {
    path.is_file()
}
