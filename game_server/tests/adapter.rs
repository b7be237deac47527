use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use game_server::{
    testing::FakeAgent, AdapterError, BufferConsole, GameDefaults, GameInfo, LaunchSpec,
    QueryMethod, ServerAdapter, ServerConfig, ServerSlot, Timings,
};

static INFO: GameInfo = GameInfo {
    id: "test",
    full_name: "Test Dedicated Server",
    author: "tests",
    description: "Shell script pretending to be a server.",
    version: "1.0",
    url: "",
    color: "#ffffff",
    app_id: "480",
    login_anonymous: true,
    start_path: "bin/server.sh",
    import_marker: "data/marker.bin",
    allows_embed_console: true,
    port_increments: 1,
    query_method: QueryMethod::None,
    defaults: GameDefaults {
        port: 9000,
        query_port: 9001,
        map: "world",
        max_players: 2,
        additional: "",
    },
    timings: Timings {
        startup_grace: Duration::from_secs(60),
        stop_wait: Duration::from_secs(60),
        stop_settle: Duration::from_secs(60),
    },
};

struct TestServer {
    slot: ServerSlot,
    notice: Option<String>,
}

impl ServerAdapter for TestServer {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn slot(&self) -> &ServerSlot {
        &self.slot
    }

    fn launch_spec(&self, config: &ServerConfig, program: &Path) -> LaunchSpec {
        let mut spec = LaunchSpec::new(program, self.slot.files_dir());
        if let Some(port) = config.port {
            spec.arg(format!("--port={port}"));
        }
        spec.args(config.extra_args());
        spec
    }

    fn prepare(&self, _config: &ServerConfig) -> game_server::Result<Option<String>> {
        Ok(self.notice.clone())
    }
}

fn server(dir: &Path, agent: Arc<FakeAgent>, console: Arc<BufferConsole>) -> TestServer {
    TestServer {
        slot: ServerSlot::new("42", dir.join("serverfiles"), agent, console).with_timings(
            Timings {
                startup_grace: Duration::ZERO,
                stop_wait: Duration::from_secs(5),
                stop_settle: Duration::ZERO,
            },
        ),
        notice: None,
    }
}

#[tokio::test]
async fn start_without_executable_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(dir.path(), Arc::default(), Arc::default());

    let err = server.start(&ServerConfig::new("42")).await.unwrap_err();

    assert!(matches!(err, AdapterError::ExecutableMissing { ref file_name, .. } if file_name == "server.sh"));
    assert!(!err.to_string().is_empty());
    assert!(!server.is_install_valid());
}

#[tokio::test]
async fn update_relays_agent_error_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(FakeAgent::failing("Error! App '480' state is 0x202 after update job."));
    let server = server(dir.path(), agent.clone(), Arc::default());

    let err = server.update(true, Some("-beta x")).await.unwrap_err();
    assert_eq!(err.to_string(), "Error! App '480' state is 0x202 after update job.");

    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].server_id, "42");
    assert_eq!(calls[0].app_id, "480");
    assert!(calls[0].validate);
    assert_eq!(calls[0].custom.as_deref(), Some("-beta x"));
    assert!(calls[0].login_anonymous);
}

#[tokio::test]
async fn builds_come_from_the_agent() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(
        dir.path(),
        Arc::new(FakeAgent::with_builds("100", "101")),
        Arc::default(),
    );

    assert_eq!(server.local_build().await.unwrap(), "100");
    assert_eq!(server.remote_build().await.unwrap(), "101");
    server.create_config().await.unwrap();
}

#[tokio::test]
async fn unknown_builds_are_build_errors() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(dir.path(), Arc::default(), Arc::default());

    let err = server.local_build().await.unwrap_err();
    assert!(matches!(err, AdapterError::Build(ref msg) if msg == "no buildid for app 480"));
    assert!(matches!(
        server.remote_build().await.unwrap_err(),
        AdapterError::Build(_)
    ));
}

#[test]
fn import_needs_marker_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(dir.path(), Arc::default(), Arc::default());

    let err = server.is_import_valid(dir.path()).unwrap_err();
    assert_eq!(err.to_string(), "Invalid Path! Fail to find marker.bin");

    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data").join("marker.bin"), b"").unwrap();
    server.is_import_valid(dir.path()).unwrap();
}

#[cfg(unix)]
fn install_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("serverfiles").join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let script = bin.join("server.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[tokio::test]
async fn start_captures_output_and_stop_interrupts() {
    let dir = tempfile::tempdir().unwrap();
    install_script(dir.path(), "echo \"ready $*\"\nexec sleep 30");

    let console = Arc::new(BufferConsole::new());
    let mut server = server(dir.path(), Arc::default(), console.clone());
    server.notice = Some(String::from("settings skipped"));
    assert!(server.is_install_valid());

    let mut config = ServerConfig::new("42");
    config.port = Some(9100);
    config.params = String::from("-x  -y");

    let handle = server.start(&config).await.unwrap();
    assert_eq!(handle.server_id(), "42");
    assert_eq!(handle.exe_name(), "server.sh");
    assert_eq!(handle.notice(), Some("settings skipped"));

    for _ in 0..100 {
        if !console.lines().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(console.text(), ["ready --port=9100 -x -y"]);

    assert!(server.stop(handle).await.exited());
}
