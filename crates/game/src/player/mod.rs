//! The player entity and its per-tick movement.

mod resolver;

use engine::{Level, Rect, Surface};

use crate::sprites::{Body, Frames};
use crate::world::constants::{FRAME_SKIP, SCALAR, TILE_SIZE};
use crate::world::{Direction, Event, RpgMap};
use resolver::{boundary_check, shuffle, slide, BoundaryCheck, Candidate, Movement, Pacing};

pub(crate) const PLAYER_SHEET: &str = "player-frames.png";
const SHEET_COLUMNS: u32 = 4;
const SHEET_ROWS: u32 = 4;
/// Image offset from the corner of the tile the player is placed on.
const TILE_OFFSET: (i32, i32) = (SCALAR, 4 * SCALAR);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MoveOutcome {
    /// A boundary crossing to hand to the state machine.
    pub(crate) event: Option<Event>,
    /// The walk animation stepped while the player moved.
    pub(crate) stepped: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) body: Body,
    pub(crate) frames: Frames,
    facing: Direction,
    pacing: Pacing,
}

impl Player {
    /// `None` when the sheet cannot hold a four by four frame grid.
    pub(crate) fn new(sheet: &Surface) -> Option<Self> {
        let frames = Frames::from_sheet(sheet, SHEET_COLUMNS, SHEET_ROWS, FRAME_SKIP, true)?;
        let body = Body::new(frames.width(), frames.height(), None);
        let mut player = Self {
            body,
            frames,
            facing: Direction::Down,
            pacing: Pacing::default(),
        };
        player.turn(Direction::Down);
        Some(player)
    }

    pub(crate) fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn level(&self) -> Level {
        self.body.level
    }

    pub(crate) fn base_rect(&self) -> Rect {
        self.body.base_rect
    }

    pub(crate) fn reset(&mut self, facing: Direction) {
        self.pacing.reset();
        self.turn(facing);
    }

    pub(crate) fn place_at_tile(&mut self, (x, y): (i32, i32), level: Level, map: &RpgMap) {
        self.place_at(
            x * TILE_SIZE + TILE_OFFSET.0,
            y * TILE_SIZE + TILE_OFFSET.1,
            level,
            map,
        );
    }

    /// Puts the image corner at `(px, py)`. Off-map positions are allowed;
    /// transitions park the player just past an edge.
    pub(crate) fn place_at(&mut self, px: i32, py: i32, level: Level, map: &RpgMap) {
        self.body.place(px, py, level);
        self.pacing.clear_deferred();
        self.frames.remask(&self.body, map);
    }

    /// Faces `facing` without animating or re-masking.
    pub(crate) fn turn(&mut self, facing: Direction) {
        self.facing = facing;
        self.frames.set_row(facing.row());
    }

    /// Faces `facing` on the spot, as one animation tick.
    pub(crate) fn set_facing(&mut self, facing: Direction, map: &RpgMap) {
        self.apply_movement(self.body.level, facing, 0, 0, map);
    }

    /// One animation tick plus a displacement. Returns true when the walk
    /// animation stepped.
    fn apply_movement(&mut self, level: Level, facing: Direction, dx: i32, dy: i32, map: &RpgMap) -> bool {
        self.body.set_level(level);
        self.turn(facing);
        let stepped = self.frames.tick(1);
        self.body.translate(dx, dy);
        self.frames.remask(&self.body, map);
        stepped
    }

    /// Moves and drops any deferred step.
    pub(crate) fn wrap_movement(
        &mut self,
        level: Level,
        facing: Direction,
        dx: i32,
        dy: i32,
        map: &RpgMap,
    ) -> bool {
        self.pacing.clear_deferred();
        self.apply_movement(level, facing, dx, dy, map)
    }

    /// Resolves one tick of held direction keys against `map`.
    pub(crate) fn handle_movement(&mut self, bits: u8, map: &RpgMap) -> MoveOutcome {
        let Some(movement) = Movement::from_bits(bits) else {
            self.pacing.reset();
            return MoveOutcome::default();
        };
        let throttled = self.pacing.count(movement);

        if let Some(step) = self.pacing.take_deferred(movement) {
            return self.step(step, movement.facing, map);
        }

        match boundary_check(map, &self.body, movement.dx, movement.dy) {
            BoundaryCheck::Crossed(event) => {
                return MoveOutcome {
                    event: Some(event),
                    stepped: false,
                };
            }
            BoundaryCheck::Inside => {
                let target = self.body.base_rect.translated(movement.dx, movement.dy);
                let check = map.is_move_valid(self.body.level, &target);
                if check.valid {
                    let step = Candidate {
                        level: check.level,
                        dx: movement.dx,
                        dy: movement.dy,
                    };
                    if movement.diagonal && throttled {
                        self.defer(movement, step, map);
                        return MoveOutcome::default();
                    }
                    return self.step(step, movement.facing, map);
                }
            }
            BoundaryCheck::Blocked => {}
        }

        let fallback = if movement.diagonal {
            slide(map, &self.body, movement)
        } else {
            shuffle(map, &self.body, movement)
        };
        match fallback {
            Some(step) => self.defer(movement, step, map),
            None if self.facing != movement.facing => self.set_facing(movement.facing, map),
            None => {}
        }
        MoveOutcome::default()
    }

    fn step(&mut self, step: Candidate, facing: Direction, map: &RpgMap) -> MoveOutcome {
        let stepped = self.wrap_movement(step.level, facing, step.dx, step.dy, map);
        MoveOutcome {
            event: None,
            stepped,
        }
    }

    /// Runs on the spot now and keeps `step` for the next tick of the same
    /// movement.
    fn defer(&mut self, movement: Movement, step: Candidate, map: &RpgMap) {
        self.apply_movement(self.body.level, movement.facing, 0, 0, map);
        self.pacing.defer(movement, step);
    }

    /// The footprint stretched one tile towards the facing direction; doors
    /// inside it can be opened.
    pub(crate) fn action_reach(&self) -> Rect {
        let (ux, uy) = self.facing.delta();
        let base = self.body.base_rect;
        base.union(&base.translated(ux * TILE_SIZE, uy * TILE_SIZE))
    }
}
