//! Events raised by triggers and collisions, and the triggers that hold them.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use engine::{Level, Rect};

use super::direction::Direction;

/// Walk through a doorway onto a tile of another map.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SceneTransition {
    pub(crate) map: String,
    pub(crate) tile: (i32, i32),
    pub(crate) level: Level,
    pub(crate) facing: Direction,
    /// When set the player arrives hidden past this edge and walks in.
    pub(crate) boundary: Option<Direction>,
}

/// Return to an exact pixel position, used for checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplayTransition {
    pub(crate) map: String,
    pub(crate) position: (i32, i32),
    pub(crate) level: Level,
    pub(crate) facing: Direction,
    pub(crate) boundary: Option<Direction>,
    /// The first map of a new game skips the walk-in.
    pub(crate) first_map: bool,
}

/// Walk off one map edge onto the facing edge of the next map.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoundaryTransition {
    pub(crate) map: String,
    pub(crate) edge: Direction,
    /// Tiles to shift the arrival position by.
    pub(crate) modifier: i32,
}

/// How a Play state was entered; replayed when a life is lost.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Arrival {
    Scene(SceneTransition),
    Replay(ReplayTransition),
}

impl Arrival {
    pub(crate) fn map_name(&self) -> &str {
        match self {
            Arrival::Scene(scene) => &scene.map,
            Arrival::Replay(replay) => &replay.map,
        }
    }

    pub(crate) fn boundary(&self) -> Option<Direction> {
        match self {
            Arrival::Scene(scene) => scene.boundary,
            Arrival::Replay(replay) => replay.boundary,
        }
    }

    pub(crate) fn first_map(&self) -> bool {
        matches!(self, Arrival::Replay(replay) if replay.first_map)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Boundary(BoundaryTransition),
    Scene(SceneTransition),
    LifeLost { game_over: bool },
    EndGame,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TileTrigger {
    pub(crate) rect: Rect,
    pub(crate) event: Event,
}

/// Tile triggers grouped by the level they fire on.
#[derive(Debug, Clone, Default)]
pub(crate) struct TileTriggers {
    groups: Vec<(Level, Vec<TileTrigger>)>,
}

impl TileTriggers {
    pub(crate) fn add(&mut self, level: Level, trigger: TileTrigger) {
        match self.groups.iter_mut().find(|(group, _)| *group == level) {
            Some((_, triggers)) => triggers.push(trigger),
            None => self.groups.push((level, vec![trigger])),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.iter().map(|(_, triggers)| triggers.len()).sum()
    }

    /// First trigger at `level` whose rect intersects `footprint`.
    pub(crate) fn event_at(&self, level: Level, footprint: &Rect) -> Option<&Event> {
        self.groups
            .iter()
            .filter(|(group, _)| *group == level)
            .flat_map(|(_, triggers)| triggers)
            .find(|trigger| trigger.rect.intersects(footprint))
            .map(|trigger| &trigger.event)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoundaryTrigger {
    pub(crate) range: RangeInclusive<i32>,
    pub(crate) event: Event,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BoundaryTriggers {
    by_edge: HashMap<Direction, Vec<BoundaryTrigger>>,
}

impl BoundaryTriggers {
    pub(crate) fn add(&mut self, edge: Direction, trigger: BoundaryTrigger) {
        self.by_edge.entry(edge).or_default().push(trigger);
    }

    pub(crate) fn len(&self) -> usize {
        self.by_edge.values().map(Vec::len).sum()
    }

    /// Event for crossing `edge` with a footprint covering `span` tiles.
    /// Every tile of the span must lie inside the registered range.
    pub(crate) fn event_for(&self, edge: Direction, span: RangeInclusive<i32>) -> Option<&Event> {
        self.by_edge
            .get(&edge)?
            .iter()
            .find(|trigger| span.clone().all(|tile| trigger.range.contains(&tile)))
            .map(|trigger| &trigger.event)
    }
}
