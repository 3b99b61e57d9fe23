//! Multi-level tile grid: walkability by level, step ("special") levels and
//! foreground masks.
//!
//! Every tile lists the levels a sprite may stand on. Plain levels are whole
//! floors; special levels are fractional steps linking two floors:
//!
//! ```text
//! [2]  [S2]  [2]   <- level 2
//! [X] [S1.5] [X]   <- top of steps, wall either side
//! [1] [S1.5] [1]   <- bottom of steps
//! [1]  [S1]  [1]   <- level 1
//! ```
//!
//! A footprint touching several tiles is valid when all of them hold the
//! sprite's level, or when all of them hold a special level within one level
//! of each other, in which case the sprite moves to the highest of them.

use std::sync::Arc;

use thiserror::Error;

use crate::geometry::Rect;
use crate::surface::{Surface, BLACK};

pub type Level = f32;

/// Specials farther than this from the requested level are ignored.
pub const SPECIAL_LEVEL_TOLERANCE: Level = 1.0;

/// Upper bound on `cols * rows` for a single grid.
pub const MAX_GRID_CELLS: usize = 1 << 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
    #[error("tile coordinate ({x}, {y}) is negative")]
    NegativeCoordinate { x: i32, y: i32 },
    #[error("grid of {cols}x{rows} tiles exceeds {MAX_GRID_CELLS} cells")]
    TooLarge { cols: i32, rows: i32 },
    #[error("tile ({x}, {y}) mask refers to layer {layer} but the tile has {layer_count} layers")]
    MaskLayerOutOfRange {
        x: i32,
        y: i32,
        layer: usize,
        layer_count: usize,
    },
}

/// Which tile layer covers a sprite standing behind it, and from what depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskDescriptor {
    pub layer: usize,
    pub level: i32,
    /// Flat masks do not cover a sprite standing on exactly `level`.
    pub flat: bool,
    pub z: i32,
}

impl MaskDescriptor {
    pub fn new(layer: usize, level: i32, flat: bool, tile_y: i32, tile_size: i32) -> Self {
        Self {
            layer,
            level,
            flat,
            z: (tile_y + 1) * tile_size + level * tile_size - 1,
        }
    }

    fn covers(&self, sprite_level: Level, sprite_z: i32) -> bool {
        if self.z <= sprite_z {
            return false;
        }
        !(self.flat && self.level as Level == sprite_level)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub levels: Vec<Level>,
    pub special_levels: Vec<Level>,
    /// Bottom to top.
    pub layers: Vec<Arc<Surface>>,
    pub masks: Vec<MaskDescriptor>,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_levels(mut self, levels: &[Level]) -> Self {
        self.levels.extend_from_slice(levels);
        self
    }

    #[must_use]
    pub fn with_special_levels(mut self, levels: &[Level]) -> Self {
        self.special_levels.extend_from_slice(levels);
        self
    }

    pub fn add_level(&mut self, level: Level) {
        self.levels.push(level);
    }

    pub fn add_layer(&mut self, image: Arc<Surface>) -> usize {
        self.layers.push(image);
        self.layers.len() - 1
    }

    pub fn add_mask(&mut self, layer: usize, level: i32, flat: bool, tile_size: i32) {
        self.masks
            .push(MaskDescriptor::new(layer, level, flat, self.y, tile_size));
    }

    /// Nearest special level strictly closer than the tolerance; the first
    /// one listed wins ties.
    pub fn nearest_special_level(&self, level: Level) -> Option<Level> {
        let mut nearest = None;
        let mut best = Level::MAX;
        for &special in &self.special_levels {
            let difference = (special - level).abs();
            if difference < best {
                best = difference;
                nearest = Some(special);
            }
        }
        nearest.filter(|_| best < SPECIAL_LEVEL_TOLERANCE)
    }

    /// Layers nearer the viewer than a sprite at `level` with depth `z`.
    pub fn masks_over(&self, level: Level, z: i32) -> Vec<Arc<Surface>> {
        self.masks
            .iter()
            .filter(|mask| mask.covers(level, z))
            .filter_map(|mask| self.layers.get(mask.layer).map(Arc::clone))
            .collect()
    }

    /// All layers flattened bottom to top; `None` when the tile has none.
    pub fn compose(&self, tile_size: i32) -> Option<Surface> {
        match self.layers.as_slice() {
            [] => None,
            [single] => Some(single.as_ref().clone()),
            layers => {
                let size = tile_size.max(0) as u32;
                let mut image = Surface::filled(size, size, BLACK);
                for layer in layers {
                    image.blit(layer, 0, 0);
                }
                Some(image)
            }
        }
    }
}

/// Inclusive range of tile coordinates. Empty when the source rect lies
/// entirely outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TileSpan {
    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.x2 - self.x1 + 1) * (self.y2 - self.y1 + 1)) as usize
    }

    /// Column-major, matching the order masks are composited in.
    pub fn points(&self) -> impl Iterator<Item = (i32, i32)> {
        let span = *self;
        (span.x1..=span.x2).flat_map(move |x| (span.y1..=span.y2).map(move |y| (x, y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCheck {
    pub valid: bool,
    pub level: Level,
}

#[derive(Debug, Clone)]
pub struct TileMasks {
    pub x: i32,
    pub y: i32,
    pub images: Vec<Arc<Surface>>,
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    tile_size: i32,
    cols: i32,
    rows: i32,
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    /// Builds a grid sized to the largest coordinate seen plus one.
    ///
    /// `extent` is the largest coordinate present in the source data, which
    /// may exceed the coordinates of `tiles` when some records carried no
    /// tile content.
    pub fn from_tiles(
        tile_size: i32,
        extent: (i32, i32),
        tiles: Vec<Tile>,
    ) -> Result<Self, TileGridError> {
        if tile_size <= 0 {
            return Err(TileGridError::InvalidTileSize(tile_size));
        }
        let (mut max_x, mut max_y) = (extent.0.max(0), extent.1.max(0));
        for tile in &tiles {
            if tile.x < 0 || tile.y < 0 {
                return Err(TileGridError::NegativeCoordinate {
                    x: tile.x,
                    y: tile.y,
                });
            }
            if let Some(mask) = tile.masks.iter().find(|mask| mask.layer >= tile.layers.len()) {
                return Err(TileGridError::MaskLayerOutOfRange {
                    x: tile.x,
                    y: tile.y,
                    layer: mask.layer,
                    layer_count: tile.layers.len(),
                });
            }
            max_x = max_x.max(tile.x);
            max_y = max_y.max(tile.y);
        }

        let cols = max_x.saturating_add(1);
        let rows = max_y.saturating_add(1);
        let cell_count = (cols as usize)
            .checked_mul(rows as usize)
            .filter(|count| *count <= MAX_GRID_CELLS)
            .ok_or(TileGridError::TooLarge { cols, rows })?;
        let mut cells = vec![None; cell_count];
        for tile in tiles {
            let index = tile.y as usize * cols as usize + tile.x as usize;
            cells[index] = Some(tile);
        }
        Ok(Self {
            tile_size,
            cols,
            rows,
            cells,
        })
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn pixel_rect(&self) -> Rect {
        Rect::from_size(self.cols * self.tile_size, self.rows * self.tile_size)
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        Some((y * self.cols + x) as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index_of(x, y)
            .and_then(|index| self.cells[index].as_ref())
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index_of(x, y)
            .and_then(|index| self.cells[index].as_mut())
    }

    /// Pixel point to tile coordinate, without clamping.
    pub fn point_to_tile(&self, px: i32, py: i32) -> (i32, i32) {
        (px.div_euclid(self.tile_size), py.div_euclid(self.tile_size))
    }

    /// Tiles touched by `rect`, clamped to the grid.
    pub fn span(&self, rect: &Rect) -> TileSpan {
        let (x1, y1) = self.point_to_tile(rect.left(), rect.top());
        let (x2, y2) = self.point_to_tile(rect.right() - 1, rect.bottom() - 1);
        TileSpan {
            x1: x1.max(0),
            y1: y1.max(0),
            x2: x2.min(self.cols - 1),
            y2: y2.min(self.rows - 1),
        }
    }

    /// Decides whether a footprint at `level` may occupy `footprint`.
    ///
    /// Missing tiles never admit any level. An empty span (footprint off the
    /// grid) is vacuously valid; callers test the map boundary first.
    pub fn is_move_valid(&self, level: Level, footprint: &Rect) -> MoveCheck {
        let span = self.span(footprint);
        let touched = span.len();
        let mut same_level = 0usize;
        let mut specials: Vec<Level> = Vec::with_capacity(touched);

        for (x, y) in span.points() {
            let Some(tile) = self.tile(x, y) else {
                continue;
            };
            if tile.levels.contains(&level) {
                same_level += 1;
            } else if tile.special_levels.contains(&level) {
                same_level += 1;
                specials.push(level);
            } else if let Some(special) = tile.nearest_special_level(level) {
                specials.push(special);
            }
        }

        if same_level == touched {
            return MoveCheck { valid: true, level };
        }
        if specials.len() == touched {
            let min = specials.iter().copied().fold(Level::MAX, Level::min);
            let max = specials.iter().copied().fold(Level::MIN, Level::max);
            if max - min < SPECIAL_LEVEL_TOLERANCE {
                return MoveCheck {
                    valid: true,
                    level: max,
                };
            }
        }
        MoveCheck {
            valid: false,
            level,
        }
    }

    /// Mask images for every tile under `rect` that is nearer the viewer
    /// than a sprite at `level` with depth `z`. Tiles without covering masks
    /// are omitted.
    pub fn masks(&self, rect: &Rect, level: Level, z: i32) -> Vec<TileMasks> {
        self.span(rect)
            .points()
            .filter_map(|(x, y)| {
                let tile = self.tile(x, y)?;
                let images = tile.masks_over(level, z);
                (!images.is_empty()).then_some(TileMasks { x, y, images })
            })
            .collect()
    }

    /// Makes `level` walkable on an existing tile. Returns false when there
    /// is no tile at `(x, y)`.
    pub fn add_level(&mut self, x: i32, y: i32, level: Level) -> bool {
        match self.tile_mut(x, y) {
            Some(tile) => {
                if !tile.levels.contains(&level) {
                    tile.add_level(level);
                }
                true
            }
            None => false,
        }
    }

    /// Flattens every tile into one image the size of the map.
    pub fn compose_background(&self) -> Surface {
        let bounds = self.pixel_rect();
        let mut background = Surface::filled(bounds.width as u32, bounds.height as u32, BLACK);
        for tile in self.cells.iter().flatten() {
            if let Some(image) = tile.compose(self.tile_size) {
                background.blit(&image, tile.x * self.tile_size, tile.y * self.tile_size);
            }
        }
        background
    }
}
