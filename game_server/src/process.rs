use std::{io, process::ExitStatus, time::Duration};

use tokio::{
    io::AsyncWriteExt,
    process::{Child, ChildStdin},
};
use tracing::{debug, warn};

/// A spawned server process. Whoever holds it owns the process.
#[derive(Debug)]
pub struct ProcessHandle {
    server_id: String,
    exe_name: String,
    pid: Option<u32>,
    child: Child,
    stdin: Option<ChildStdin>,
    notice: Option<String>,
}

#[derive(Debug)]
pub enum StopOutcome {
    Exited(ExitStatus),
    /// The process ignored the interrupt within the wait window.
    StillRunning(ProcessHandle),
}

impl StopOutcome {
    pub fn exited(&self) -> bool {
        matches!(self, StopOutcome::Exited(_))
    }
}

impl ProcessHandle {
    pub(crate) fn new(server_id: &str, exe_name: &str, mut child: Child) -> ProcessHandle {
        ProcessHandle {
            server_id: String::from(server_id),
            exe_name: String::from(exe_name),
            pid: child.id(),
            stdin: child.stdin.take(),
            child,
            notice: None,
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn exe_name(&self) -> &str {
        &self.exe_name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-fatal remark left by `start`, e.g. a settings file that was skipped.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn with_notice(mut self, notice: Option<String>) -> ProcessHandle {
        self.notice = notice;
        self
    }

    /// Write one console command to the server's stdin.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin not captured"))?;

        stdin.write_all(format!("{line}\n").as_bytes()).await?;
        stdin.flush().await
    }

    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Ask the process to shut down the way Ctrl+C would. Never kills it.
    pub fn interrupt(&self) -> io::Result<()> {
        let pid = self
            .pid
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "process has no pid"))?;

        debug!(server = %self.server_id, pid, "interrupting");
        send_interrupt(pid)
    }

    /// Interrupt, wait up to `wait` for exit, then pause for `settle`.
    pub async fn stop(mut self, wait: Duration, settle: Duration) -> StopOutcome {
        if let Ok(Some(status)) = self.child.try_wait() {
            return StopOutcome::Exited(status);
        }

        if let Err(e) = self.interrupt() {
            warn!(server = %self.server_id, "couldn't interrupt {}: {e}", self.exe_name);
        }

        drop(self.stdin.take());

        let waited = tokio::time::timeout(wait, self.child.wait()).await;
        let outcome = match waited {
            Ok(Ok(status)) => StopOutcome::Exited(status),
            Ok(Err(e)) => {
                warn!(server = %self.server_id, "waiting for {} failed: {e}", self.exe_name);
                StopOutcome::StillRunning(self)
            }
            Err(_) => {
                warn!(
                    server = %self.server_id,
                    "{} still running after {}ms",
                    self.exe_name,
                    wait.as_millis()
                );
                StopOutcome::StillRunning(self)
            }
        };

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        outcome
    }
}

#[cfg(unix)]
fn send_interrupt(pid: u32) -> io::Result<()> {
    use nix::{
        errno::Errno,
        sys::signal::{self, Signal},
        unistd::Pid,
    };

    match signal::kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

// taskkill without /F posts WM_CLOSE, the closest thing to Ctrl+C a
// windowless console process gets from outside.
#[cfg(windows)]
fn send_interrupt(pid: u32) -> io::Result<()> {
    std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(not(any(unix, windows)))]
fn send_interrupt(_pid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no interrupt signal on this platform",
    ))
}
