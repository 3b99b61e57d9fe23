//! State shared by every game state: assets, the player, world records and
//! the screen being composed.

use engine::{AssetCache, AssetError, AssetKind, Surface};
use thiserror::Error;

use crate::app::config::GameConfig;
use crate::hud::Hud;
use crate::notify::{Notification, NotificationSink};
use crate::player::{Player, PLAYER_SHEET};
use crate::world::{MapLoadError, MapLoader, Registry, RpgMap};

#[derive(Debug, Error)]
pub(crate) enum GameError {
    #[error(transparent)]
    MapLoad(#[from] MapLoadError),
    #[error("failed to load player frames: {0}")]
    PlayerFrames(#[source] AssetError),
    #[error("player sheet is too small for a four by four frame grid")]
    PlayerSheetTooSmall,
}

pub(crate) struct Session {
    pub(crate) config: GameConfig,
    pub(crate) assets: AssetCache,
    pub(crate) loader: MapLoader,
    pub(crate) registry: Registry,
    pub(crate) player: Player,
    pub(crate) hud: Hud,
    /// The frame shown after each tick.
    pub(crate) screen: Surface,
    pub(crate) notifier: Box<dyn NotificationSink>,
}

impl Session {
    pub(crate) fn new(
        config: GameConfig,
        mut assets: AssetCache,
        notifier: Box<dyn NotificationSink>,
    ) -> Result<Self, GameError> {
        let sheet = assets
            .image(AssetKind::Sprite, PLAYER_SHEET)
            .map_err(GameError::PlayerFrames)?;
        let player = Player::new(&sheet).ok_or(GameError::PlayerSheetTooSmall)?;
        let hud = Hud::load(&mut assets, config.view_width as i32, config.lives);
        let screen = Surface::filled(config.view_width, config.view_height, engine::surface::BLACK);
        Ok(Self {
            config,
            assets,
            loader: MapLoader::default(),
            registry: Registry::default(),
            player,
            hud,
            screen,
            notifier,
        })
    }

    pub(crate) fn view_size(&self) -> (i32, i32) {
        self.config.view_size()
    }

    pub(crate) fn load_map(&mut self, name: &str) -> Result<RpgMap, GameError> {
        Ok(self.loader.load(&mut self.assets, name)?)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifier.notify(notification);
    }
}
