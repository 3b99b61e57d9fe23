//! Movement resolution: input bits to a displacement, boundary detection,
//! and the slide / shuffle fallbacks for blocked moves.
//!
//! The fallbacks are pure: they only report a step that would succeed, and
//! the player applies it.

use std::ops::RangeInclusive;

use engine::{Level, Rect};

use crate::sprites::Body;
use crate::world::constants::{MOVE_UNIT, TILE_SIZE};
use crate::world::{Direction, Event, RpgMap};

/// Every third consecutive diagonal tick runs on the spot.
const DIAGONAL_THROTTLE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Movement {
    pub(crate) bits: u8,
    pub(crate) dx: i32,
    pub(crate) dy: i32,
    pub(crate) facing: Direction,
    pub(crate) diagonal: bool,
}

impl Movement {
    /// Canonical movement for a set of direction bits. Diagonals face along
    /// their horizontal component; opposing or empty sets do not move.
    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        const UP: u8 = Direction::Up.bit();
        const DOWN: u8 = Direction::Down.bit();
        const LEFT: u8 = Direction::Left.bit();
        const RIGHT: u8 = Direction::Right.bit();
        let m = MOVE_UNIT;
        let (dx, dy, facing) = match bits {
            UP => (0, -m, Direction::Up),
            DOWN => (0, m, Direction::Down),
            LEFT => (-m, 0, Direction::Left),
            RIGHT => (m, 0, Direction::Right),
            b if b == UP | LEFT => (-m, -m, Direction::Left),
            b if b == UP | RIGHT => (m, -m, Direction::Right),
            b if b == DOWN | LEFT => (-m, m, Direction::Left),
            b if b == DOWN | RIGHT => (m, m, Direction::Right),
            _ => return None,
        };
        Some(Self {
            bits,
            dx,
            dy,
            facing,
            diagonal: dx != 0 && dy != 0,
        })
    }
}

/// A displacement known to be valid, with the level it lands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) level: Level,
    pub(crate) dx: i32,
    pub(crate) dy: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BoundaryCheck {
    /// The moved image stays on the map.
    Inside,
    /// Leaving the map through a registered range.
    Crossed(Event),
    /// Leaving the map where nothing is registered; the move is refused.
    Blocked,
}

/// Deferred displacement plus the diagonal throttle counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Pacing {
    deferred: Option<(Movement, Candidate)>,
    diagonal_ticks: u32,
}

impl Pacing {
    /// Counts a tick of `movement`. True when this diagonal tick is the
    /// throttled one.
    pub(crate) fn count(&mut self, movement: Movement) -> bool {
        if !movement.diagonal {
            self.diagonal_ticks = 0;
            return false;
        }
        self.diagonal_ticks += 1;
        if self.diagonal_ticks >= DIAGONAL_THROTTLE {
            self.diagonal_ticks = 0;
            return true;
        }
        false
    }

    /// The deferred step, when it was stored for this same movement. A
    /// different movement discards it.
    pub(crate) fn take_deferred(&mut self, movement: Movement) -> Option<Candidate> {
        match self.deferred.take() {
            Some((pending, candidate)) if pending == movement => Some(candidate),
            _ => None,
        }
    }

    pub(crate) fn defer(&mut self, movement: Movement, candidate: Candidate) {
        self.deferred = Some((movement, candidate));
    }

    pub(crate) fn clear_deferred(&mut self) {
        self.deferred = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

fn stays_on_map(map: &RpgMap, body: &Body, dx: i32, dy: i32) -> bool {
    map.pixel_rect().contains(&body.map_rect.translated(dx, dy))
}

pub(crate) fn boundary_check(map: &RpgMap, body: &Body, dx: i32, dy: i32) -> BoundaryCheck {
    let bounds = map.pixel_rect();
    let moved = body.map_rect.translated(dx, dy);
    if bounds.contains(&moved) {
        return BoundaryCheck::Inside;
    }
    let Some(edge) = crossed_edge(&bounds, &moved) else {
        return BoundaryCheck::Blocked;
    };
    match map.boundary_event(edge, tile_span(&body.base_rect, edge)) {
        Some(event) => BoundaryCheck::Crossed(event.clone()),
        None => BoundaryCheck::Blocked,
    }
}

/// Edge a moved rect pokes through. A vertical edge wins over a horizontal
/// one when both are crossed.
pub(crate) fn crossed_edge(bounds: &Rect, moved: &Rect) -> Option<Direction> {
    let mut edge = None;
    if moved.left() < bounds.left() {
        edge = Some(Direction::Left);
    } else if moved.right() > bounds.right() {
        edge = Some(Direction::Right);
    }
    if moved.top() < bounds.top() {
        edge = Some(Direction::Up);
    } else if moved.bottom() > bounds.bottom() {
        edge = Some(Direction::Down);
    }
    edge
}

/// Tile columns (top and bottom edges) or rows (left and right edges)
/// covered by a footprint.
pub(crate) fn tile_span(footprint: &Rect, edge: Direction) -> RangeInclusive<i32> {
    if edge.is_vertical() {
        footprint.left().div_euclid(TILE_SIZE)..=(footprint.right() - 1).div_euclid(TILE_SIZE)
    } else {
        footprint.top().div_euclid(TILE_SIZE)..=(footprint.bottom() - 1).div_euclid(TILE_SIZE)
    }
}

/// For a blocked diagonal: the horizontal component alone, else the
/// vertical one.
pub(crate) fn slide(map: &RpgMap, body: &Body, movement: Movement) -> Option<Candidate> {
    [(movement.dx, 0), (0, movement.dy)]
        .into_iter()
        .find_map(|(dx, dy)| {
            if !stays_on_map(map, body, dx, dy) {
                return None;
            }
            let check = map.is_move_valid(body.level, &body.base_rect.translated(dx, dy));
            check.valid.then_some(Candidate {
                level: check.level,
                dx,
                dy,
            })
        })
}

/// For a blocked straight move: finds the nearest sideways offset, up to
/// half a tile, from which the move would succeed, and returns one unit
/// step towards it. Offsets are tried nearest first, the negative side
/// before the positive.
pub(crate) fn shuffle(map: &RpgMap, body: &Body, movement: Movement) -> Option<Candidate> {
    let reach = TILE_SIZE / 2 / MOVE_UNIT;
    for distance in 1..=reach {
        for sign in [-1, 1] {
            let offset = sign * distance * MOVE_UNIT;
            let (ox, oy) = if movement.dx == 0 { (offset, 0) } else { (0, offset) };
            if !stays_on_map(map, body, ox + movement.dx, oy + movement.dy) {
                continue;
            }
            let shifted = body.base_rect.translated(ox, oy);
            let aside = map.is_move_valid(body.level, &shifted);
            if !aside.valid {
                continue;
            }
            let ahead = map.is_move_valid(aside.level, &shifted.translated(movement.dx, movement.dy));
            if !ahead.valid {
                continue;
            }
            let (nx, ny) = (ox.signum() * MOVE_UNIT, oy.signum() * MOVE_UNIT);
            if !stays_on_map(map, body, nx, ny) {
                continue;
            }
            let nudge = map.is_move_valid(body.level, &body.base_rect.translated(nx, ny));
            if nudge.valid {
                return Some(Candidate {
                    level: nudge.level,
                    dx: nx,
                    dy: ny,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Tile, TileGrid};

    use crate::world::events::{BoundaryTransition, BoundaryTrigger, BoundaryTriggers, TileTriggers};

    /// `rows` strings of `.` (level 1) and `#` (no level).
    fn map_from(rows: &[&str], boundaries: BoundaryTriggers) -> RpgMap {
        let mut tiles = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                let tile = Tile::new(x as i32, y as i32);
                tiles.push(if cell == '.' { tile.with_levels(&[1.0]) } else { tile });
            }
        }
        let extent = (rows[0].len() as i32 - 1, rows.len() as i32 - 1);
        let grid = TileGrid::from_tiles(TILE_SIZE, extent, tiles).expect("grid");
        RpgMap::new("test", grid, TileTriggers::default(), boundaries, Vec::new())
    }

    fn body_at(x: i32, y: i32) -> Body {
        let mut body = Body::new(TILE_SIZE, TILE_SIZE, Some(16));
        body.place(x, y, 1.0);
        body
    }

    #[test]
    fn from_bits_maps_diagonals_to_horizontal_facing() {
        let movement = Movement::from_bits(Direction::Up.bit() | Direction::Left.bit())
            .expect("diagonal");
        assert_eq!((movement.dx, movement.dy), (-MOVE_UNIT, -MOVE_UNIT));
        assert_eq!(movement.facing, Direction::Left);
        assert!(movement.diagonal);
        assert_eq!(Movement::from_bits(Direction::Up.bit() | Direction::Down.bit()), None);
        assert_eq!(Movement::from_bits(0), None);
    }

    #[test]
    fn pacing_throttles_every_third_diagonal_tick() {
        let mut pacing = Pacing::default();
        let diagonal = Movement::from_bits(Direction::Down.bit() | Direction::Right.bit())
            .expect("diagonal");
        let straight = Movement::from_bits(Direction::Down.bit()).expect("straight");

        let throttled: Vec<bool> = (0..6).map(|_| pacing.count(diagonal)).collect();
        assert_eq!(throttled, vec![false, false, true, false, false, true]);

        pacing.count(diagonal);
        pacing.count(straight);
        assert!(!pacing.count(diagonal));
        assert!(!pacing.count(diagonal));
    }

    #[test]
    fn take_deferred_drops_step_for_other_movement() {
        let mut pacing = Pacing::default();
        let up = Movement::from_bits(Direction::Up.bit()).expect("up");
        let left = Movement::from_bits(Direction::Left.bit()).expect("left");
        let step = Candidate {
            level: 1.0,
            dx: 0,
            dy: -MOVE_UNIT,
        };

        pacing.defer(up, step);
        assert_eq!(pacing.take_deferred(left), None);
        assert!(pacing.deferred.is_none());

        pacing.defer(up, step);
        assert_eq!(pacing.take_deferred(up), Some(step));
    }

    #[test]
    fn boundary_fires_only_for_whole_row_span() {
        let mut boundaries = BoundaryTriggers::default();
        let event = Event::Boundary(BoundaryTransition {
            map: "west".to_string(),
            edge: Direction::Left,
            modifier: 2,
        });
        boundaries.add(
            Direction::Left,
            BoundaryTrigger {
                range: 10..=12,
                event: event.clone(),
            },
        );
        let rows: Vec<String> = (0..16).map(|_| ".".repeat(4)).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let map = map_from(&rows, boundaries);

        // footprint rows 10..=10, fully inside the range
        let inside = body_at(0, 10 * TILE_SIZE - 2);
        assert_eq!(tile_span(&inside.base_rect, Direction::Left), 10..=10);
        assert_eq!(boundary_check(&map, &inside, -MOVE_UNIT, 0), BoundaryCheck::Crossed(event));

        // footprint rows 12..=13, sticking out of the range
        let straddling = body_at(0, 13 * TILE_SIZE - 18);
        assert_eq!(tile_span(&straddling.base_rect, Direction::Left), 12..=13);
        assert_eq!(boundary_check(&map, &straddling, -MOVE_UNIT, 0), BoundaryCheck::Blocked);

        assert_eq!(boundary_check(&map, &inside, MOVE_UNIT, 0), BoundaryCheck::Inside);
    }

    #[test]
    fn crossed_edge_prefers_vertical_edges() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(crossed_edge(&bounds, &Rect::new(-2, -2, 10, 10)), Some(Direction::Up));
        assert_eq!(crossed_edge(&bounds, &Rect::new(95, 50, 10, 10)), Some(Direction::Right));
        assert_eq!(crossed_edge(&bounds, &Rect::new(5, 5, 10, 10)), None);
    }

    #[test]
    fn slide_prefers_horizontal_component() {
        let map = map_from(&["...", "...", "..."], BoundaryTriggers::default());
        let body = body_at(TILE_SIZE, TILE_SIZE);
        let movement = Movement::from_bits(Direction::Up.bit() | Direction::Left.bit())
            .expect("diagonal");

        let candidate = slide(&map, &body, movement).expect("slides");
        assert_eq!((candidate.dx, candidate.dy), (-MOVE_UNIT, 0));
    }

    #[test]
    fn slide_falls_back_to_vertical_along_a_wall() {
        let map = map_from(&["...", "#..", "..."], BoundaryTriggers::default());
        // footprint flush against the wall on its left
        let body = body_at(TILE_SIZE - 8, TILE_SIZE);
        let movement = Movement::from_bits(Direction::Down.bit() | Direction::Left.bit())
            .expect("diagonal");

        let candidate = slide(&map, &body, movement).expect("slides");
        assert_eq!((candidate.dx, candidate.dy), (0, MOVE_UNIT));
    }

    #[test]
    fn shuffle_nudges_towards_a_gap() {
        // a one-tile doorway at column 1 of row 0
        let map = map_from(&["#.#", "...", "..."], BoundaryTriggers::default());
        // footprint spans x 52..68, straddling the doorway and the wall
        let body = body_at(TILE_SIZE + 12, TILE_SIZE / 2);
        let movement = Movement::from_bits(Direction::Up.bit()).expect("up");
        let ahead = body.base_rect.translated(0, -TILE_SIZE);
        assert!(!map.is_move_valid(1.0, &ahead).valid);

        let candidate = shuffle(&map, &body, movement).expect("nudge");
        assert_eq!((candidate.dx, candidate.dy), (-MOVE_UNIT, 0));
    }

    #[test]
    fn shuffle_gives_up_against_a_solid_wall() {
        let map = map_from(&["###", "...", "..."], BoundaryTriggers::default());
        let body = body_at(TILE_SIZE, TILE_SIZE / 2);
        let movement = Movement::from_bits(Direction::Up.bit()).expect("up");
        assert_eq!(shuffle(&map, &body, movement), None);
    }
}
