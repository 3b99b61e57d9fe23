//! Window, loop, pixels and tiles for a 2D tile game. The game crate plugs
//! in through [`Game`] and [`run_app`].

pub mod app;
mod asset_names;
pub mod assets;
pub mod geometry;
mod paths;
pub mod surface;
pub mod tiles;

pub use app::{run_app, AppError, Game, GameCommand, InputAction, InputSnapshot, LoopConfig};
pub use asset_names::AssetNameError;
pub use assets::{AssetCache, AssetError, AssetKey, AssetKind};
pub use geometry::Rect;
pub use paths::{resolve_app_paths, AppPaths, StartupError, ROOT_ENV_VAR};
pub use surface::{Surface, SurfaceError};
pub use tiles::{
    Level, MaskDescriptor, MoveCheck, Tile, TileGrid, TileGridError, TileMasks, TileSpan,
};
