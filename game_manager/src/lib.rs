mod cli;
pub use cli::*;

mod config;
pub use config::*;

mod manager;
pub use manager::*;

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use game_server::{
    ConsoleSink, ServerAdapter, ServerSlot, SteamCmd, StopOutcome, TracingConsole, UpdateAgent,
};
use tracing::{info, warn};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = default_manager();

    if let Command::Games = cli.command {
        for game in manager.games() {
            println!(
                "{:<14} {:<32} app {:<8} port {}",
                game.id, game.full_name, game.app_id, game.defaults.port
            );
        }
        return Ok(());
    }

    let config = ManagerConfig::load(&cli.config)?;
    let console: Arc<dyn ConsoleSink> = Arc::new(TracingConsole);
    let agent: Arc<dyn UpdateAgent> = Arc::new(
        SteamCmd::new(&config.steamcmd_path, &config.servers_root, console.clone())
            .with_username(config.steam_username.clone()),
    );

    match cli.command {
        Command::Games => Ok(()),
        Command::Start { server } => {
            let (adapter, entry) = open(&manager, &config, &server, agent, console)?;
            serve(adapter.as_ref(), entry).await
        }
        Command::Update {
            server,
            validate,
            custom,
        } => {
            let (adapter, _) = open(&manager, &config, &server, agent, console)?;
            let status = adapter.update(validate, custom.as_deref()).await?;
            println!("{} updated ({status})", adapter.info().full_name);
            Ok(())
        }
        Command::Status { server } => {
            let (adapter, _) = open(&manager, &config, &server, agent, console)?;
            status(adapter.as_ref()).await;
            Ok(())
        }
    }
}

fn open<'a>(
    manager: &GameManager,
    config: &'a ManagerConfig,
    server_id: &str,
    agent: Arc<dyn UpdateAgent>,
    console: Arc<dyn ConsoleSink>,
) -> anyhow::Result<(Box<dyn ServerAdapter>, &'a ServerEntry)> {
    let entry = config
        .server(server_id)
        .ok_or_else(|| anyhow!("No server with id {server_id}"))?;

    let slot = ServerSlot::under_root(&config.servers_root, server_id, agent, console);
    let adapter = manager
        .adapter(&entry.game, slot)
        .ok_or_else(|| anyhow!("No server of type {}", entry.game))?;

    Ok((adapter, entry))
}

async fn serve(adapter: &dyn ServerAdapter, entry: &ServerEntry) -> anyhow::Result<()> {
    let mut handle = adapter
        .start(&entry.config)
        .await
        .with_context(|| format!("{} couldn't start", adapter.info().full_name))?;

    if let Some(notice) = handle.notice() {
        println!("[Notice] {notice}");
    }

    let (sender, receiver) = tokio::sync::oneshot::channel();
    let sender = Mutex::new(Some(sender));
    ctrlc::set_handler(move || {
        println!("^C");
        if let Some(sender) = sender.lock().unwrap().take() {
            sender.send(()).unwrap_or_default();
        }
    })?;

    let interrupted = tokio::select! {
        _ = receiver => true,
        status = handle.wait() => {
            info!(server = %entry.config.server_id, "server exited on its own: {status:?}");
            false
        }
    };

    if interrupted {
        match adapter.stop(handle).await {
            StopOutcome::Exited(status) => info!("{} stopped ({status})", adapter.info().full_name),
            StopOutcome::StillRunning(handle) => warn!(
                pid = ?handle.pid(),
                "{} is still running",
                adapter.info().full_name
            ),
        }
    }

    Ok(())
}

async fn status(adapter: &dyn ServerAdapter) {
    let info = adapter.info();
    println!("{} ({})", info.full_name, adapter.slot().files_dir().display());
    println!("  installed:    {}", adapter.is_install_valid());

    match adapter.local_build().await {
        Ok(build) => println!("  local build:  {build}"),
        Err(e) => println!("  local build:  unknown ({e})"),
    }
    match adapter.remote_build().await {
        Ok(build) => println!("  remote build: {build}"),
        Err(e) => println!("  remote build: unknown ({e})"),
    }
}
