use std::{path::Path, sync::Arc, time::Duration};

use factorio::{FactorioServer, INFO};
use game_server::{
    testing::FakeAgent, AdapterError, BufferConsole, ServerAdapter, ServerConfig, ServerSlot,
    SupportedGame, Timings,
};

fn slot(dir: &Path, agent: Arc<FakeAgent>, console: Arc<BufferConsole>) -> ServerSlot {
    ServerSlot::under_root(dir, "7", agent, console).with_timings(Timings::immediate())
}

#[tokio::test]
async fn start_fails_cleanly_when_not_installed() {
    let dir = tempfile::tempdir().unwrap();
    let server = FactorioServer::build(slot(dir.path(), Arc::default(), Arc::default()));

    let err = server
        .start(&ServerConfig::from_defaults("7", &INFO.defaults))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::ExecutableMissing { .. }));
    let message = err.to_string();
    assert!(message.starts_with(&format!("{} not found (", INFO.exe_name())));
    assert!(message.contains("serverfiles"));
}

#[tokio::test]
async fn update_logs_in_with_an_account() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(FakeAgent::default());
    let server = FactorioServer::build(slot(dir.path(), agent.clone(), Arc::default()));

    assert!(server.update(false, None).await.unwrap().success());

    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].app_id, "427520");
    assert_eq!(calls[0].server_id, "7");
    assert!(!calls[0].login_anonymous);
    assert!(!calls[0].validate);
}

#[test]
fn import_looks_for_package_info() {
    let dir = tempfile::tempdir().unwrap();
    let server = FactorioServer::build(slot(dir.path(), Arc::default(), Arc::default()));

    assert_eq!(
        server.is_import_valid(dir.path()).unwrap_err().to_string(),
        "Invalid Path! Fail to find PackageInfo.bin"
    );

    std::fs::write(dir.path().join("PackageInfo.bin"), b"").unwrap();
    assert!(server.is_import_valid(dir.path()).is_ok());
}

#[cfg(unix)]
#[tokio::test]
async fn runs_and_stops_an_installed_server() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let console = Arc::new(BufferConsole::new());
    let server = FactorioServer::build(slot(dir.path(), Arc::default(), console.clone()));

    let exe = server.exe_path();
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    std::fs::write(&exe, "#!/bin/sh\necho \"$@\"\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
    assert!(server.is_install_valid());

    let save = server.slot().file("saves/nauvis.zip");
    std::fs::create_dir_all(save.parent().unwrap()).unwrap();
    std::fs::write(&save, b"").unwrap();

    let mut config = ServerConfig::from_defaults("7", &INFO.defaults);
    config.map = String::from("nauvis");
    config.port = Some(34200);

    let handle = server.start(&config).await.unwrap();
    assert!(handle.notice().is_none());

    for _ in 0..100 {
        if !console.lines().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(
        console.text(),
        ["--start-server saves/nauvis.zip --config=config/config.ini --server-settings data/server-settings.json --port 34200"]
    );

    assert!(server.stop(handle).await.exited());
}
