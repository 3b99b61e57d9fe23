use engine::{resolve_app_paths, AssetCache, LoopConfig, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, ConfigError, GameConfig};
use super::driver::StateMachine;
use crate::notify::TracingSink;
use crate::session::{GameError, Session};
use crate::world::constants::{COLOR_KEY, SCALAR};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) game: StateMachine,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Tile Quest Startup ===");

    let paths = resolve_app_paths()?;
    let game_config = load_game_config(&paths.assets_dir)?;
    info!(
        assets = %paths.assets_dir.display(),
        start_map = %game_config.start.map,
        lives = game_config.lives,
        "game_configured"
    );

    let config = loop_config(&game_config);
    let assets = AssetCache::new(&paths.assets_dir, SCALAR as u32, Some(COLOR_KEY));
    let notifier = Box::new(TracingSink::new(game_config.sound_enabled));
    let session = Session::new(game_config, assets, notifier)?;

    Ok(AppWiring {
        config,
        game: StateMachine::new(session),
    })
}

fn loop_config(game: &GameConfig) -> LoopConfig {
    LoopConfig {
        window_title: "Tile Quest".to_string(),
        view_width: game.view_width,
        view_height: game.view_height,
        window_scale: game.window_scale,
        ..LoopConfig::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
