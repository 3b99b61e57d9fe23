use std::ops::RangeInclusive;

use engine::{Level, MoveCheck, Rect, Surface, TileGrid, TileMasks};

use super::direction::Direction;
use super::events::{BoundaryTriggers, Event, TileTriggers};

/// A sprite placement read from a map file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpriteSpawn {
    /// Stable across visits so the registry can find it again.
    pub(crate) uid: String,
    pub(crate) kind: String,
    pub(crate) level: Level,
    /// Spawn tile first, then the rest of the waypoint path.
    pub(crate) points: Vec<(i32, i32)>,
}

/// A loaded map: tile grid, pre-composited background, triggers and spawns.
#[derive(Debug, Clone)]
pub(crate) struct RpgMap {
    name: String,
    grid: TileGrid,
    background: Surface,
    tile_triggers: TileTriggers,
    boundary_triggers: BoundaryTriggers,
    spawns: Vec<SpriteSpawn>,
}

impl RpgMap {
    pub(crate) fn new(
        name: impl Into<String>,
        grid: TileGrid,
        tile_triggers: TileTriggers,
        boundary_triggers: BoundaryTriggers,
        spawns: Vec<SpriteSpawn>,
    ) -> Self {
        let background = grid.compose_background();
        Self {
            name: name.into(),
            grid,
            background,
            tile_triggers,
            boundary_triggers,
            spawns,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub(crate) fn pixel_rect(&self) -> Rect {
        self.grid.pixel_rect()
    }

    pub(crate) fn spawns(&self) -> &[SpriteSpawn] {
        &self.spawns
    }

    pub(crate) fn is_move_valid(&self, level: Level, footprint: &Rect) -> MoveCheck {
        self.grid.is_move_valid(level, footprint)
    }

    pub(crate) fn masks(&self, rect: &Rect, level: Level, z: i32) -> Vec<TileMasks> {
        self.grid.masks(rect, level, z)
    }

    pub(crate) fn tile_event(&self, level: Level, footprint: &Rect) -> Option<&Event> {
        self.tile_triggers.event_at(level, footprint)
    }

    pub(crate) fn boundary_event(&self, edge: Direction, span: RangeInclusive<i32>) -> Option<&Event> {
        self.boundary_triggers.event_for(edge, span)
    }

    /// Opens `level` on tile `(x, y)`. Walkability only: the background is
    /// left as it is.
    pub(crate) fn add_level(&mut self, x: i32, y: i32, level: Level) -> bool {
        self.grid.add_level(x, y, level)
    }

    /// Copies the `view` window of the background onto `target`; anything
    /// outside the map is black.
    pub(crate) fn draw_background(&self, target: &mut Surface, view: Rect) {
        if !self.pixel_rect().contains(&view) {
            target.fill(engine::surface::BLACK);
        }
        target.blit_region(&self.background, view, 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Tile;

    use crate::world::constants::TILE_SIZE;

    fn two_by_one() -> RpgMap {
        let mut left = Tile::new(0, 0).with_levels(&[1.0]);
        left.add_layer(std::sync::Arc::new(Surface::filled(
            TILE_SIZE as u32,
            TILE_SIZE as u32,
            [200, 10, 10, 255],
        )));
        let right = Tile::new(1, 0).with_levels(&[1.0]);
        let grid = TileGrid::from_tiles(TILE_SIZE, (1, 0), vec![left, right]).expect("grid");
        RpgMap::new(
            "test",
            grid,
            TileTriggers::default(),
            BoundaryTriggers::default(),
            Vec::new(),
        )
    }

    #[test]
    fn pixel_rect_follows_grid_size() {
        assert_eq!(two_by_one().pixel_rect(), Rect::new(0, 0, 2 * TILE_SIZE, TILE_SIZE));
    }

    #[test]
    fn draw_background_blacks_out_area_past_the_map() {
        let map = two_by_one();
        let mut target = Surface::filled(4 * TILE_SIZE as u32, TILE_SIZE as u32, [1, 2, 3, 255]);

        map.draw_background(&mut target, Rect::new(-TILE_SIZE, 0, 4 * TILE_SIZE, TILE_SIZE));

        assert_eq!(target.pixel(0, 0), Some(engine::surface::BLACK));
        assert_eq!(target.pixel(TILE_SIZE, 0), Some([200, 10, 10, 255]));
        assert_eq!(target.pixel(3 * TILE_SIZE + 1, 0), Some(engine::surface::BLACK));
    }

    #[test]
    fn add_level_opens_existing_tiles_only() {
        let mut map = two_by_one();
        assert!(map.add_level(1, 0, 2.0));
        assert!(!map.add_level(5, 5, 2.0));
        let check = map.is_move_valid(2.0, &Rect::new(TILE_SIZE + 4, 4, 8, 8));
        assert!(check.valid);
    }
}
