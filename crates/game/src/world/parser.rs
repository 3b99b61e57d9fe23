//! Line-oriented map file parser.
//!
//! ```text
//! # tiles: coordinate, optional levels, then tileset references
//! 4,7 [1,S1.5] outdoor:grass outdoor:wall:V2 outdoor:arch:1
//! # sprites: type, level, spawn tile, then waypoints
//! sprite beetle 1 3,3 8,3
//! # triggers: geometry | event
//! trigger tile 5,0 1 | scene cave 2,9 1 up
//! trigger boundary left 10 12 | boundary west left 1
//! ```
//!
//! Bad rows are skipped one at a time so a typo never sinks a whole map.

use std::num::{ParseFloatError, ParseIntError};
use std::ops::RangeInclusive;

use engine::{Level, Rect};
use thiserror::Error;
use tracing::debug;

use super::constants::TILE_SIZE;
use super::direction::Direction;
use super::events::{
    BoundaryTransition, BoundaryTrigger, BoundaryTriggers, Event, SceneTransition, TileTrigger,
    TileTriggers,
};
use super::map::SpriteSpawn;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MaskRef {
    pub(crate) level: i32,
    pub(crate) flat: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TileImageRef {
    pub(crate) tileset: String,
    pub(crate) tile: String,
    pub(crate) mask: Option<MaskRef>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TileRecord {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) levels: Vec<Level>,
    pub(crate) special_levels: Vec<Level>,
    pub(crate) images: Vec<TileImageRef>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedMap {
    pub(crate) tiles: Vec<TileRecord>,
    /// Largest tile coordinate seen on any tile row.
    pub(crate) extent: (i32, i32),
    pub(crate) spawns: Vec<SpriteSpawn>,
    pub(crate) tile_triggers: TileTriggers,
    pub(crate) boundary_triggers: BoundaryTriggers,
    pub(crate) skipped_rows: usize,
}

#[derive(Debug, Error)]
enum RowError {
    #[error("unknown record '{0}'")]
    UnknownRecord(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("bad coordinate '{0}'")]
    Coordinate(String),
    #[error("bad level '{token}': {source}")]
    Level {
        token: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("bad number '{token}': {source}")]
    Number {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unclosed level list '{0}'")]
    Bracket(String),
    #[error("bad direction '{0}'")]
    Direction(String),
    #[error("bad tile reference '{0}'")]
    TileRef(String),
    #[error("unexpected trailing '{0}'")]
    Trailing(String),
}

enum Row {
    Tile(TileRecord),
    Sprite(SpriteSpawn),
    TileTrigger(Level, TileTrigger),
    BoundaryTrigger(Direction, BoundaryTrigger),
}

pub(crate) fn parse_map(name: &str, text: &str) -> ParsedMap {
    let mut parsed = ParsedMap::default();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(content, _)| content).trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(name, line) {
            Ok(Row::Tile(record)) => {
                parsed.extent.0 = parsed.extent.0.max(record.x);
                parsed.extent.1 = parsed.extent.1.max(record.y);
                parsed.tiles.push(record);
            }
            Ok(Row::Sprite(spawn)) => parsed.spawns.push(spawn),
            Ok(Row::TileTrigger(level, trigger)) => parsed.tile_triggers.add(level, trigger),
            Ok(Row::BoundaryTrigger(edge, trigger)) => parsed.boundary_triggers.add(edge, trigger),
            Err(error) => {
                parsed.skipped_rows += 1;
                debug!(map = name, line = index + 1, error = %error, "map_row_skipped");
            }
        }
    }
    parsed
}

fn parse_row(map: &str, line: &str) -> Result<Row, RowError> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next().ok_or(RowError::Missing("record"))?;
    match first {
        "sprite" => parse_sprite(map, tokens).map(Row::Sprite),
        "trigger" => parse_trigger(line),
        _ if first.starts_with(|c: char| c.is_ascii_digit()) => {
            parse_tile(first, tokens).map(Row::Tile)
        }
        _ => Err(RowError::UnknownRecord(first.to_string())),
    }
}

fn parse_tile<'a>(
    coordinate: &str,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<TileRecord, RowError> {
    let (x, y) = parse_point(coordinate)?;
    let mut record = TileRecord {
        x,
        y,
        ..TileRecord::default()
    };
    let mut tokens = tokens.peekable();
    if let Some(bracket) = tokens.next_if(|token| token.starts_with('[')) {
        let inner = bracket
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| RowError::Bracket(bracket.to_string()))?;
        for token in inner.split(',').filter(|token| !token.is_empty()) {
            match token.strip_prefix('S').or_else(|| token.strip_prefix('s')) {
                Some(special) => record.special_levels.push(parse_level(special)?),
                None => record.levels.push(parse_level(token)?),
            }
        }
    }
    for token in tokens {
        record.images.push(parse_tile_ref(token)?);
    }
    Ok(record)
}

fn parse_tile_ref(token: &str) -> Result<TileImageRef, RowError> {
    let mut parts = token.split(':');
    let (Some(tileset), Some(tile)) = (parts.next(), parts.next()) else {
        return Err(RowError::TileRef(token.to_string()));
    };
    if tileset.is_empty() || tile.is_empty() {
        return Err(RowError::TileRef(token.to_string()));
    }
    let mask = match parts.next() {
        None => None,
        Some(mask) => {
            let (flat, level) = match mask.strip_prefix('V').or_else(|| mask.strip_prefix('v')) {
                Some(level) => (false, level),
                None => (true, mask),
            };
            Some(MaskRef {
                level: parse_number(level)?,
                flat,
            })
        }
    };
    if let Some(extra) = parts.next() {
        return Err(RowError::Trailing(extra.to_string()));
    }
    Ok(TileImageRef {
        tileset: tileset.to_string(),
        tile: tile.to_string(),
        mask,
    })
}

fn parse_sprite<'a>(
    map: &str,
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<SpriteSpawn, RowError> {
    let kind = tokens.next().ok_or(RowError::Missing("sprite type"))?;
    let level = parse_level(tokens.next().ok_or(RowError::Missing("sprite level"))?)?;
    let points = tokens.map(parse_point).collect::<Result<Vec<_>, _>>()?;
    let (x, y) = *points.first().ok_or(RowError::Missing("spawn tile"))?;
    Ok(SpriteSpawn {
        uid: format!("{map}:{kind}:{x},{y}"),
        kind: kind.to_string(),
        level,
        points,
    })
}

fn parse_trigger(line: &str) -> Result<Row, RowError> {
    let (geometry, event) = line.split_once('|').ok_or(RowError::Missing("'|' and event"))?;
    let event = parse_event(event)?;
    let mut tokens = geometry.split_whitespace().skip(1);
    match tokens.next().ok_or(RowError::Missing("trigger kind"))? {
        "tile" => {
            let (x, y) = parse_point(tokens.next().ok_or(RowError::Missing("trigger tile"))?)?;
            let level = parse_level(tokens.next().ok_or(RowError::Missing("trigger level"))?)?;
            reject_trailing(tokens)?;
            let rect = Rect::new(x * TILE_SIZE, y * TILE_SIZE, TILE_SIZE, TILE_SIZE);
            Ok(Row::TileTrigger(level, TileTrigger { rect, event }))
        }
        "boundary" => {
            let edge = parse_direction(tokens.next().ok_or(RowError::Missing("trigger edge"))?)?;
            let min = parse_number(tokens.next().ok_or(RowError::Missing("range start"))?)?;
            let max = tokens.next().map(parse_number).transpose()?.unwrap_or(min);
            reject_trailing(tokens)?;
            let range: RangeInclusive<i32> = min..=max;
            Ok(Row::BoundaryTrigger(edge, BoundaryTrigger { range, event }))
        }
        other => Err(RowError::UnknownRecord(format!("trigger {other}"))),
    }
}

fn parse_event(text: &str) -> Result<Event, RowError> {
    let mut tokens = text.split_whitespace();
    let event = match tokens.next().ok_or(RowError::Missing("event"))? {
        "scene" => {
            let map = tokens.next().ok_or(RowError::Missing("scene map"))?;
            let tile = parse_point(tokens.next().ok_or(RowError::Missing("scene tile"))?)?;
            let level = parse_level(tokens.next().ok_or(RowError::Missing("scene level"))?)?;
            let facing = parse_direction(tokens.next().ok_or(RowError::Missing("scene facing"))?)?;
            let boundary = tokens.next().map(parse_direction).transpose()?;
            Event::Scene(SceneTransition {
                map: map.to_string(),
                tile,
                level,
                facing,
                boundary,
            })
        }
        "boundary" => {
            let map = tokens.next().ok_or(RowError::Missing("boundary map"))?;
            let edge = parse_direction(tokens.next().ok_or(RowError::Missing("boundary edge"))?)?;
            let modifier = tokens.next().map(parse_number).transpose()?.unwrap_or(0);
            Event::Boundary(BoundaryTransition {
                map: map.to_string(),
                edge,
                modifier,
            })
        }
        "endgame" => Event::EndGame,
        other => return Err(RowError::UnknownRecord(other.to_string())),
    };
    reject_trailing(tokens)?;
    Ok(event)
}

fn reject_trailing<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<(), RowError> {
    match tokens.next() {
        Some(extra) => Err(RowError::Trailing(extra.to_string())),
        None => Ok(()),
    }
}

fn parse_point(token: &str) -> Result<(i32, i32), RowError> {
    let (x, y) = token
        .split_once(',')
        .ok_or_else(|| RowError::Coordinate(token.to_string()))?;
    match (x.trim().parse::<i32>(), y.trim().parse::<i32>()) {
        (Ok(x), Ok(y)) if x >= 0 && y >= 0 => Ok((x, y)),
        _ => Err(RowError::Coordinate(token.to_string())),
    }
}

fn parse_level(token: &str) -> Result<Level, RowError> {
    token.parse::<Level>().map_err(|source| RowError::Level {
        token: token.to_string(),
        source,
    })
}

fn parse_number(token: &str) -> Result<i32, RowError> {
    token.parse::<i32>().map_err(|source| RowError::Number {
        token: token.to_string(),
        source,
    })
}

fn parse_direction(token: &str) -> Result<Direction, RowError> {
    Direction::parse(token).ok_or_else(|| RowError::Direction(token.to_string()))
}
