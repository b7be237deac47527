use std::collections::BTreeMap;

use game_server::{GameInfo, ServerAdapter, ServerSlot, SupportedGame};
use tracing::info;

type Builder = Box<dyn Fn(ServerSlot) -> Box<dyn ServerAdapter> + Send + Sync>;

struct Registration {
    info: &'static GameInfo,
    build: Builder,
}

/// Knows every supported title and builds adapters for server slots.
#[derive(Default)]
pub struct GameManager {
    games: BTreeMap<&'static str, Registration>,
}

impl GameManager {
    pub fn new() -> GameManager {
        GameManager::default()
    }

    pub fn register<T>(&mut self)
    where
        T: SupportedGame,
    {
        let info = T::game_info();
        self.games.insert(
            info.id,
            Registration {
                info,
                build: Box::new(|slot| -> Box<dyn ServerAdapter> { Box::new(T::build(slot)) }),
            },
        );

        info!("{} registered", info.full_name);
    }

    pub fn games(&self) -> impl Iterator<Item = &'static GameInfo> + '_ {
        self.games.values().map(|r| r.info)
    }

    pub fn info(&self, game: &str) -> Option<&'static GameInfo> {
        self.games.get(game).map(|r| r.info)
    }

    pub fn adapter(&self, game: &str, slot: ServerSlot) -> Option<Box<dyn ServerAdapter>> {
        self.games.get(game).map(|r| (r.build)(slot))
    }
}

/// Manager with every title this workspace ships.
pub fn default_manager() -> GameManager {
    let mut manager = GameManager::new();

    manager.register::<factorio::FactorioServer>();
    manager.register::<satisfactory::SatisfactoryServer>();

    manager
}
