use std::collections::HashSet;

use engine::{AssetCache, AssetKind};
use tracing::{debug, warn};

use super::frames::Frames;
use super::kinds::SpriteKind;
use super::Entity;
use crate::world::constants::FRAME_SKIP;
use crate::world::{Registry, RpgMap};

/// Spawns the entities of `map`. Registry records are applied first: they
/// re-open doors on the map and suppress anything already used up.
/// Unknown kinds and missing art skip the spawn.
pub(crate) fn build_sprites(
    map: &mut RpgMap,
    registry: &Registry,
    assets: &mut AssetCache,
    view_size: (i32, i32),
) -> Vec<Entity> {
    let spawns = map.spawns().to_vec();
    let mut sprites = Vec::with_capacity(spawns.len());
    let mut unknown = HashSet::new();
    let mut suppressed = 0usize;

    for spawn in &spawns {
        if let Some(record) = registry.get(&spawn.uid) {
            record.apply_map_actions(map);
            if record.is_inactive() {
                suppressed += 1;
                continue;
            }
        }
        let Some(kind) = SpriteKind::from_name(&spawn.kind) else {
            if unknown.insert(spawn.kind.as_str()) {
                warn!(map = map.name(), kind = %spawn.kind, uid = %spawn.uid, "sprite_type_unknown");
            }
            continue;
        };
        let Some(frames) = load_frames(assets, kind) else {
            continue;
        };
        sprites.push(Entity::spawn(spawn, kind, frames, map, view_size));
    }

    debug!(map = map.name(), sprites = sprites.len(), suppressed, "sprites_built");
    sprites
}

fn load_frames(assets: &mut AssetCache, kind: SpriteKind) -> Option<Frames> {
    let profile = kind.profile();
    let sheet = assets.optional_image(AssetKind::Sprite, profile.sheet)?;
    let frames = Frames::from_sheet(&sheet, profile.columns, profile.rows, FRAME_SKIP, profile.maskable);
    if frames.is_none() {
        warn!(kind = kind.name(), sheet = profile.sheet, "sprite_sheet_too_small");
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Surface, Tile, TileGrid};

    use crate::world::constants::TILE_SIZE;
    use crate::world::events::{BoundaryTriggers, TileTriggers};
    use crate::world::{SpriteSpawn, WorldRecord};

    fn spawn(kind: &str, x: i32, y: i32) -> SpriteSpawn {
        SpriteSpawn {
            uid: format!("yard:{kind}:{x},{y}"),
            kind: kind.to_string(),
            level: 1.0,
            points: vec![(x, y)],
        }
    }

    fn yard(spawns: Vec<SpriteSpawn>) -> RpgMap {
        let tiles = (0..3)
            .flat_map(|x| (0..3).map(move |y| Tile::new(x, y).with_levels(&[1.0])))
            .collect();
        let grid = TileGrid::from_tiles(TILE_SIZE, (2, 2), tiles).expect("grid");
        RpgMap::new("yard", grid, TileTriggers::default(), BoundaryTriggers::default(), spawns)
    }

    fn assets() -> AssetCache {
        let mut assets = AssetCache::new("unused-root", 2, None);
        for kind in [SpriteKind::Coin, SpriteKind::Door] {
            let profile = kind.profile();
            assets.insert(
                AssetKind::Sprite,
                profile.sheet,
                Surface::filled(profile.columns * 24, profile.rows * 24, [1, 1, 1, 255]),
            );
        }
        assets
    }

    #[test]
    fn collected_coin_is_never_spawned_again() {
        let mut map = yard(vec![spawn("coin", 0, 0), spawn("coin", 1, 1)]);
        let mut registry = Registry::default();
        registry.record("yard:coin:0,0", WorldRecord::Coin { collected: true });

        let first = build_sprites(&mut map, &registry, &mut assets(), (640, 512));
        let again = build_sprites(&mut map, &registry, &mut assets(), (640, 512));

        for sprites in [first, again] {
            let uids: Vec<&str> = sprites.iter().map(|sprite| sprite.uid.as_str()).collect();
            assert_eq!(uids, vec!["yard:coin:1,1"]);
        }
    }

    #[test]
    fn open_door_record_reapplies_level_and_skips_spawn() {
        let mut map = yard(vec![spawn("door", 1, 0)]);
        let mut registry = Registry::default();
        registry.record(
            "yard:door:1,0",
            WorldRecord::Door {
                tile: (1, 0),
                level: 2.0,
                open: true,
            },
        );

        let sprites = build_sprites(&mut map, &registry, &mut assets(), (640, 512));

        assert!(sprites.is_empty());
        assert!(map.grid().tile(1, 1).is_some_and(|tile| tile.levels.contains(&2.0)));
    }

    #[test]
    fn unknown_kinds_and_missing_art_are_skipped() {
        let mut map = yard(vec![spawn("dragon", 0, 0), spawn("key", 1, 0), spawn("coin", 2, 2)]);

        let sprites = build_sprites(&mut map, &Registry::default(), &mut assets(), (640, 512));

        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].kind, SpriteKind::Coin);
    }
}
