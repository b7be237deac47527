use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{ConsoleSink, Timings, UpdateAgent};

/// `<servers_root>/<server_id>/serverfiles`
pub fn server_files_dir(servers_root: &Path, server_id: &str) -> PathBuf {
    servers_root.join(server_id).join("serverfiles")
}

/// One host-managed server slot: where its files live and who it talks to.
#[derive(Clone)]
pub struct ServerSlot {
    server_id: String,
    files_dir: PathBuf,
    agent: Arc<dyn UpdateAgent>,
    console: Arc<dyn ConsoleSink>,
    timings: Option<Timings>,
}

impl ServerSlot {
    pub fn new(
        server_id: &str,
        files_dir: impl Into<PathBuf>,
        agent: Arc<dyn UpdateAgent>,
        console: Arc<dyn ConsoleSink>,
    ) -> ServerSlot {
        ServerSlot {
            server_id: String::from(server_id),
            files_dir: files_dir.into(),
            agent,
            console,
            timings: None,
        }
    }

    pub fn under_root(
        servers_root: &Path,
        server_id: &str,
        agent: Arc<dyn UpdateAgent>,
        console: Arc<dyn ConsoleSink>,
    ) -> ServerSlot {
        ServerSlot::new(
            server_id,
            server_files_dir(servers_root, server_id),
            agent,
            console,
        )
    }

    /// Replace the title's own timings, mostly useful for tests.
    pub fn with_timings(mut self, timings: Timings) -> ServerSlot {
        self.timings = Some(timings);
        self
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Resolve a `/` separated path relative to the server files.
    pub fn file(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.files_dir.clone(), |path, part| path.join(part))
    }

    pub fn agent(&self) -> &Arc<dyn UpdateAgent> {
        &self.agent
    }

    pub fn console(&self) -> &Arc<dyn ConsoleSink> {
        &self.console
    }

    pub fn timings_or(&self, fallback: Timings) -> Timings {
        self.timings.unwrap_or(fallback)
    }
}

impl std::fmt::Debug for ServerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSlot")
            .field("server_id", &self.server_id)
            .field("files_dir", &self.files_dir)
            .field("timings", &self.timings)
            .finish()
    }
}
