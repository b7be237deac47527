use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gsm", about = "Run and update dedicated game servers")]
pub struct Cli {
    /// Manager config file.
    #[arg(long, short, env = "GSM_CONFIG", default_value = "gsm.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List supported games.
    Games,

    /// Start a server and keep it running until Ctrl+C.
    Start { server: String },

    /// Install or update a server through SteamCMD.
    Update {
        server: String,

        #[arg(long)]
        validate: bool,

        /// Extra arguments appended to `app_update`, e.g. "-beta experimental".
        #[arg(long, allow_hyphen_values = true)]
        custom: Option<String>,
    },

    /// Show install state and build versions.
    Status { server: String },
}
