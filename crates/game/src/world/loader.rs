use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use engine::{AssetCache, AssetError, AssetKind, Rect, Surface, Tile, TileGrid, TileGridError};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::constants::TILE_SIZE;
use super::map::RpgMap;
use super::parser::{parse_map, TileRecord};

#[derive(Debug, Error)]
pub(crate) enum MapLoadError {
    #[error("failed to read map '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: AssetError,
    },
    #[error("map '{name}' has an invalid tile grid: {source}")]
    Grid {
        name: String,
        #[source]
        source: TileGridError,
    },
}

/// Named tile images cut from one tileset sheet.
#[derive(Debug, Default)]
struct Tileset {
    tiles: HashMap<String, Arc<Surface>>,
}

/// Builds maps from `maps/<name>.map`, keeping every tileset it has cut.
#[derive(Debug, Default)]
pub(crate) struct MapLoader {
    /// `None` remembers a tileset that failed to load.
    tilesets: HashMap<String, Option<Tileset>>,
    unresolved: HashSet<(String, String)>,
}

impl MapLoader {
    pub(crate) fn load(&mut self, assets: &mut AssetCache, name: &str) -> Result<RpgMap, MapLoadError> {
        let text = assets
            .read_text(AssetKind::Map, &format!("{name}.map"))
            .map_err(|source| MapLoadError::Read {
                name: name.to_string(),
                source,
            })?;
        let parsed = parse_map(name, &text);
        let tiles = parsed
            .tiles
            .iter()
            .map(|record| self.build_tile(assets, record))
            .collect();
        let grid = TileGrid::from_tiles(TILE_SIZE, parsed.extent, tiles).map_err(|source| {
            MapLoadError::Grid {
                name: name.to_string(),
                source,
            }
        })?;

        info!(
            map = name,
            cols = grid.cols(),
            rows = grid.rows(),
            spawns = parsed.spawns.len(),
            tile_triggers = parsed.tile_triggers.len(),
            boundary_triggers = parsed.boundary_triggers.len(),
            skipped_rows = parsed.skipped_rows,
            "map_loaded"
        );
        Ok(RpgMap::new(
            name,
            grid,
            parsed.tile_triggers,
            parsed.boundary_triggers,
            parsed.spawns,
        ))
    }

    fn build_tile(&mut self, assets: &mut AssetCache, record: &TileRecord) -> Tile {
        let mut tile = Tile::new(record.x, record.y)
            .with_levels(&record.levels)
            .with_special_levels(&record.special_levels);
        for reference in &record.images {
            let Some(image) = self.tile_image(assets, &reference.tileset, &reference.tile) else {
                continue;
            };
            let layer = tile.add_layer(image);
            if let Some(mask) = &reference.mask {
                tile.add_mask(layer, mask.level, mask.flat, TILE_SIZE);
            }
        }
        tile
    }

    fn tile_image(&mut self, assets: &mut AssetCache, tileset: &str, tile: &str) -> Option<Arc<Surface>> {
        let set = self
            .tilesets
            .entry(tileset.to_string())
            .or_insert_with(|| load_tileset(assets, tileset))
            .as_ref()?;
        let image = set.tiles.get(tile).cloned();
        if image.is_none() && self.unresolved.insert((tileset.to_string(), tile.to_string())) {
            warn!(tileset, tile, "tile_name_unresolved");
        }
        image
    }
}

/// Cuts `tiles/<name>.png` into the cells listed by `tiles/<name>_metadata.txt`,
/// one `x,y name` line per cell.
fn load_tileset(assets: &mut AssetCache, name: &str) -> Option<Tileset> {
    let sheet = assets.optional_image(AssetKind::Tileset, &format!("{name}.png"))?;
    let metadata = match assets.read_text(AssetKind::Tileset, &format!("{name}_metadata.txt")) {
        Ok(text) => text,
        Err(error) => {
            warn!(tileset = name, error = %error, "tileset_metadata_missing");
            return None;
        }
    };

    let mut tileset = Tileset::default();
    for (index, line) in metadata.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((x, y, tile)) = parse_metadata_line(line) else {
            debug!(tileset = name, line = index + 1, "tileset_row_skipped");
            continue;
        };
        let cell = Rect::new(x * TILE_SIZE, y * TILE_SIZE, TILE_SIZE, TILE_SIZE);
        tileset
            .tiles
            .insert(tile.to_string(), Arc::new(sheet.copy_region(cell)));
    }
    debug!(tileset = name, tiles = tileset.tiles.len(), "tileset_loaded");
    Some(tileset)
}

fn parse_metadata_line(line: &str) -> Option<(i32, i32, &str)> {
    let (point, tile) = line.split_once(char::is_whitespace)?;
    let (x, y) = point.split_once(',')?;
    let tile = tile.trim();
    if tile.is_empty() {
        return None;
    }
    Some((x.parse().ok()?, y.parse().ok()?, tile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Level;
    use std::fs;
    use tempfile::TempDir;

    use crate::world::constants::SCALAR;

    const GRASS: [u8; 4] = [10, 160, 10, 255];
    const ARCH: [u8; 4] = [120, 120, 120, 255];

    fn asset_dir(map: &str) -> (TempDir, AssetCache) {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("maps")).expect("maps dir");
        fs::create_dir_all(dir.path().join("tiles")).expect("tiles dir");
        fs::write(dir.path().join("maps/yard.map"), map).expect("write map");
        fs::write(
            dir.path().join("tiles/outdoor_metadata.txt"),
            "0,0 grass\n1,0 arch\nbogus\n",
        )
        .expect("write metadata");

        let mut sheet = Surface::new(2 * TILE_SIZE as u32, TILE_SIZE as u32);
        sheet.fill_rect(Rect::new(0, 0, TILE_SIZE, TILE_SIZE), GRASS);
        sheet.fill_rect(Rect::new(TILE_SIZE, 0, TILE_SIZE, TILE_SIZE), ARCH);
        let mut assets = AssetCache::new(dir.path(), SCALAR as u32, None);
        assets.insert(AssetKind::Tileset, "outdoor.png", sheet);
        (dir, assets)
    }

    #[test]
    fn load_builds_grid_layers_and_masks() {
        let (_dir, mut assets) = asset_dir(
            "0,0 [1] outdoor:grass\n1,0 [1] outdoor:grass outdoor:arch:V2\n1,2 [1]\n",
        );
        let mut loader = MapLoader::default();

        let map = loader.load(&mut assets, "yard").expect("map loads");

        assert_eq!(map.grid().cols(), 2);
        assert_eq!(map.grid().rows(), 3);
        let arch = map.grid().tile(1, 0).expect("tile present");
        assert_eq!(arch.layers.len(), 2);
        assert_eq!(arch.masks.len(), 1);
        assert!(!arch.masks[0].flat);
        assert_eq!(arch.masks[0].layer, 1);
        assert!(map.grid().tile(0, 1).is_none());
        assert_eq!(arch.levels, vec![1.0 as Level]);
    }

    #[test]
    fn unresolved_tile_does_not_consume_a_layer() {
        let (_dir, mut assets) =
            asset_dir("0,0 [1] outdoor:missing outdoor:arch:1 nowhere:grass\n");
        let mut loader = MapLoader::default();

        let map = loader.load(&mut assets, "yard").expect("map loads");

        let tile = map.grid().tile(0, 0).expect("tile present");
        assert_eq!(tile.layers.len(), 1);
        assert_eq!(tile.masks[0].layer, 0);
        assert_eq!(tile.layers[0].pixel(0, 0), Some(ARCH));
    }

    #[test]
    fn missing_map_file_is_a_read_error() {
        let (_dir, mut assets) = asset_dir("0,0 [1]\n");
        let mut loader = MapLoader::default();

        let error = loader.load(&mut assets, "nowhere").expect_err("no such map");
        assert!(matches!(error, MapLoadError::Read { ref name, .. } if name == "nowhere"));
    }

    #[test]
    fn oversized_map_is_a_grid_error() {
        let (_dir, mut assets) = asset_dir("0,0 [1]\n50000,50000 [1]\n");
        let mut loader = MapLoader::default();

        let error = loader.load(&mut assets, "yard").expect_err("grid too large");
        assert!(matches!(
            error,
            MapLoadError::Grid {
                source: TileGridError::TooLarge { cols: 50_001, rows: 50_001 },
                ..
            }
        ));
    }

    #[test]
    fn metadata_line_needs_point_and_name() {
        assert_eq!(parse_metadata_line("2,3 wall"), Some((2, 3, "wall")));
        assert_eq!(parse_metadata_line("2,3"), None);
        assert_eq!(parse_metadata_line("a,3 wall"), None);
    }
}
