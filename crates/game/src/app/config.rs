use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use engine::Level;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::world::Direction;

pub(crate) const CONFIG_FILE: &str = "game.json";
pub(crate) const START_MAP_ENV_VAR: &str = "TILEQUEST_START_MAP";

/// Wipes divide the view into 64 steps per axis.
const VIEW_STEPS: u32 = 64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) view_width: u32,
    pub(crate) view_height: u32,
    pub(crate) window_scale: u32,
    pub(crate) lives: i32,
    pub(crate) sound_enabled: bool,
    pub(crate) start: StartConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StartConfig {
    pub(crate) map: String,
    pub(crate) tile: (i32, i32),
    pub(crate) level: Level,
    pub(crate) facing: Direction,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            view_width: 640,
            view_height: 512,
            window_scale: 1,
            lives: 2,
            sound_enabled: true,
            start: StartConfig::default(),
        }
    }
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            map: "central".to_string(),
            tile: (30, 21),
            level: 3.0,
            facing: Direction::Down,
        }
    }
}

impl GameConfig {
    pub(crate) fn view_size(&self) -> (i32, i32) {
        (self.view_width as i32, self.view_height as i32)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}'{location}: {source}")]
    Parse {
        path: PathBuf,
        /// Empty, or " at <json path>".
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}' at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

/// Reads `game.json` from the asset directory, or the defaults when the
/// file is absent, then applies the start map override.
pub(crate) fn load_game_config(assets_dir: &Path) -> Result<GameConfig, ConfigError> {
    let path = assets_dir.join(CONFIG_FILE);
    let mut config = if path.is_file() {
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = parse_game_config(&path, &raw)?;
        info!(path = %path.display(), "config_loaded");
        config
    } else {
        info!(path = %path.display(), "config_defaults");
        GameConfig::default()
    };
    validate(&path, &config)?;
    if let Some(map) = resolve_start_map_override() {
        config.start.map = map;
    }
    Ok(config)
}

fn parse_game_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        let location = if json_path.is_empty() || json_path == "." {
            String::new()
        } else {
            format!(" at {json_path}")
        };
        ConfigError::Parse {
            path: path.to_path_buf(),
            location,
            source: error.into_inner(),
        }
    })
}

fn validate(path: &Path, config: &GameConfig) -> Result<(), ConfigError> {
    let invalid = |field: &'static str, message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        field,
        message,
    };
    if config.view_width < VIEW_STEPS {
        return Err(invalid(
            "view_width",
            format!("expected at least {VIEW_STEPS}, got {}", config.view_width),
        ));
    }
    if config.view_height < VIEW_STEPS {
        return Err(invalid(
            "view_height",
            format!("expected at least {VIEW_STEPS}, got {}", config.view_height),
        ));
    }
    if config.window_scale == 0 {
        return Err(invalid("window_scale", "expected at least 1, got 0".to_string()));
    }
    if config.lives < 0 {
        return Err(invalid("lives", format!("expected 0 or more, got {}", config.lives)));
    }
    if config.start.map.trim().is_empty() {
        return Err(invalid("start.map", "expected a map name".to_string()));
    }
    Ok(())
}

fn resolve_start_map_override() -> Option<String> {
    match env::var(START_MAP_ENV_VAR) {
        Ok(raw) => {
            let name = raw.trim();
            if name.is_empty() {
                warn!(
                    var = START_MAP_ENV_VAR,
                    "invalid start map override (empty); using configured start map"
                );
                return None;
            }
            info!(var = START_MAP_ENV_VAR, map = name, "start_map_override");
            Some(name.to_string())
        }
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!(
                var = START_MAP_ENV_VAR,
                "start map override is not valid unicode; using configured start map"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(raw: &str) -> Result<GameConfig, ConfigError> {
        parse_game_config(Path::new("game.json"), raw)
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config = parse(r#"{ "lives": 5, "start": { "map": "cave" } }"#).expect("valid config");

        assert_eq!(config.lives, 5);
        assert_eq!(config.start.map, "cave");
        assert_eq!(config.start.tile, (30, 21));
        assert_eq!(config.view_size(), (640, 512));
    }

    #[test]
    fn parse_error_names_the_json_path() {
        let error = parse(r#"{ "start": { "level": "high" } }"#).expect_err("bad level");
        let message = error.to_string();
        assert!(message.contains("at start.level"), "{message}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse(r#"{ "gravity": 9.8 }"#).expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = load_game_config(dir.path()).expect("defaults");
        assert_eq!(config.view_size(), GameConfig::default().view_size());
        assert_eq!(config.lives, 2);
        assert!(config.sound_enabled);
    }

    #[test]
    fn file_on_disk_is_validated() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "view_width": 32 }"#).expect("write config");

        let error = load_game_config(dir.path()).expect_err("view too small");
        assert!(matches!(error, ConfigError::Invalid { field: "view_width", .. }));
    }
}
