mod adapter;
pub use adapter::*;

mod config;
pub use config::*;

mod console;
pub use console::*;

mod error;
pub use error::*;

pub mod ini;

mod info;
pub use info::*;

mod launch;
pub use launch::*;

mod process;
pub use process::*;

mod slot;
pub use slot::*;

pub mod steamcmd;
pub use steamcmd::{SteamCmd, UpdateAgent};

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
