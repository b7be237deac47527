use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::IniError;

pub const GAME_SESSION_SECTION: &str = "[/Script/Engine.GameSession]";
const MAX_PLAYERS_KEY: &str = "MaxPlayers=";

static MAX_PLAYERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"MaxPlayers=\d+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IniOutcome {
    Written,
    /// There was no file to update.
    Missing,
}

/// Set `MaxPlayers` under the game session section.
///
/// An existing key is replaced in place. When the key exists but the
/// section header doesn't, the header goes directly above the key. With no
/// key at all, the section and key are appended.
pub fn upsert_max_players(text: &str, max_players: u32) -> String {
    let line = format!("{MAX_PLAYERS_KEY}{max_players}");
    let block = format!("{GAME_SESSION_SECTION}\n\n{line}");

    if text.contains(MAX_PLAYERS_KEY) {
        let replacement = if text.contains(GAME_SESSION_SECTION) {
            line
        } else {
            block
        };

        MAX_PLAYERS
            .replace_all(text, regex::NoExpand(&replacement))
            .into_owned()
    } else {
        let mut text = String::from(text);
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&block);
        text
    }
}

/// Apply `upsert_max_players` to a file on disk.
pub fn update_max_players_file(path: &Path, max_players: u32) -> Result<IniOutcome, IniError> {
    if !path.is_file() {
        return Ok(IniOutcome::Missing);
    }

    let text = std::fs::read_to_string(path).map_err(|source| IniError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, upsert_max_players(&text, max_players)).map_err(|source| {
        IniError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(IniOutcome::Written)
}
