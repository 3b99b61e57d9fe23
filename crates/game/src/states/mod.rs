//! The game state machine. One `execute` call per tick; `Ok(None)` keeps
//! the current state and `Ok(Some(next))` hands over to `next`.

use engine::surface::BLACK;
use engine::{AssetKind, InputAction, InputSnapshot, Rect, Surface};
use tracing::{debug, info};

use crate::notify::{MusicTrack, Notification};
use crate::player::Player;
use crate::session::{GameError, Session};
use crate::sprites::{
    build_sprites, draw_items, sort_by_depth, DrawItem, Entity, Observer, SpriteKind, UpdateContext,
};
use crate::world::constants::{MOVE_UNIT, SCALAR, TILE_SIZE};
use crate::world::direction::direction_bits;
use crate::world::view::view_rect;
use crate::world::{
    Arrival, BoundaryTransition, Direction, Event, Registry, RegistrySnapshot, ReplayTransition,
    RpgMap,
};

/// Ticks to close the view down to black, and to open it again.
const WIPE_TICKS: u32 = 32;
/// Wipes and slides cut the view into this many steps per axis.
const VIEW_STEPS: i32 = 64;
/// Walk-in ticks after a doorway.
const DOORWAY_TICKS: u32 = 16;
const BOUNDARY_TICKS_VERTICAL: u32 = 24;
const BOUNDARY_TICKS_HORIZONTAL: u32 = 14;

const TITLE_BANNER: &str = "title.png";
const GAME_OVER_TOP_BANNER: &str = "gameover-top.png";
const GAME_OVER_BOTTOM_BANNER: &str = "gameover-bottom.png";
const END_GAME_BANNER: &str = "endgame.png";

pub(crate) type NextState = Option<Box<dyn GameState>>;

pub(crate) trait GameState {
    fn name(&self) -> &'static str;
    fn execute(&mut self, session: &mut Session, input: &InputSnapshot) -> Result<NextState, GameError>;
}

include!("common.rs");
include!("title.rs");
include!("play.rs");
include!("scene_transition.rs");
include!("boundary_transition.rs");
include!("show_player.rs");
include!("game_over.rs");
include!("end_game.rs");

pub(crate) fn initial_state() -> Box<dyn GameState> {
    Box::new(TitleState::new())
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
