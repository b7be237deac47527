use std::sync::Mutex;

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        })
    }
}

/// Where captured server output ends up.
pub trait ConsoleSink: Send + Sync {
    fn append(&self, server_id: &str, stream: Stream, line: String);
}

/// Forwards every line to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn append(&self, server_id: &str, stream: Stream, line: String) {
        info!(target: "console", server = %server_id, %stream, "{line}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub server_id: String,
    pub stream: Stream,
    pub line: String,
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl BufferConsole {
    pub fn new() -> BufferConsole {
        BufferConsole::default()
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn text(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.line.clone())
            .collect()
    }
}

impl ConsoleSink for BufferConsole {
    fn append(&self, server_id: &str, stream: Stream, line: String) {
        self.lines.lock().unwrap().push(ConsoleLine {
            server_id: String::from(server_id),
            stream,
            line,
        });
    }
}
