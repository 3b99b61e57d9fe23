//! Non-player entities: one struct, behaviour picked by a tagged variant.

mod body;
mod builder;
mod draw;
mod frames;
mod kinds;
mod strategies;

pub(crate) use body::Body;
pub(crate) use builder::build_sprites;
pub(crate) use draw::{draw_items, sort_by_depth, DrawItem};
pub(crate) use frames::Frames;
pub(crate) use kinds::SpriteKind;
pub(crate) use strategies::Observer;

use engine::Rect;
use tracing::{debug, info};

use crate::notify::{Notification, NotificationSink};
use crate::world::constants::TILE_SIZE;
use crate::world::{Registry, RpgMap, SpriteSpawn, WorldRecord};
use strategies::{MovementStrategy, RobotPath, ZoomWatch};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Behaviour {
    /// Animated while on screen; nothing else.
    Scenery,
    /// Collected on touch.
    Pickup,
    Door { opening: bool },
    Baddie(MovementStrategy),
}

/// Everything an entity may touch while updating.
pub(crate) struct UpdateContext<'a> {
    pub(crate) map: &'a mut RpgMap,
    pub(crate) registry: &'a mut Registry,
    pub(crate) notifier: &'a mut dyn NotificationSink,
    pub(crate) player: Observer,
}

#[derive(Debug, Clone)]
pub(crate) struct Entity {
    pub(crate) uid: String,
    pub(crate) kind: SpriteKind,
    /// Spawn tile.
    pub(crate) tile: (i32, i32),
    pub(crate) body: Body,
    pub(crate) frames: Frames,
    pub(crate) behaviour: Behaviour,
    pub(crate) in_view: bool,
    pub(crate) to_remove: bool,
}

impl Entity {
    pub(crate) fn spawn(
        spawn: &SpriteSpawn,
        kind: SpriteKind,
        frames: Frames,
        map: &RpgMap,
        view_size: (i32, i32),
    ) -> Self {
        let profile = kind.profile();
        let tile = spawn.points.first().copied().unwrap_or_default();
        let to_pixels = |(x, y): (i32, i32)| {
            (
                x * TILE_SIZE + profile.offset.0,
                y * TILE_SIZE + profile.offset.1,
            )
        };
        let (px, py) = to_pixels(tile);
        let mut body = Body::new(frames.width(), frames.height(), profile.base_width);
        body.place(px, py, spawn.level);

        let behaviour = match kind {
            SpriteKind::Flames => Behaviour::Scenery,
            SpriteKind::Coin | SpriteKind::Key => Behaviour::Pickup,
            SpriteKind::Door => Behaviour::Door { opening: false },
            SpriteKind::Beetle => Behaviour::Baddie(MovementStrategy::Robot(RobotPath::new(
                spawn.points.iter().copied().map(to_pixels).collect(),
            ))),
            SpriteKind::Wasp => Behaviour::Baddie(MovementStrategy::Zoom(ZoomWatch::new(
                body.base_rect,
                view_size.0,
                view_size.1,
            ))),
        };

        let mut entity = Self {
            uid: spawn.uid.clone(),
            kind,
            tile,
            body,
            frames,
            behaviour,
            in_view: false,
            to_remove: false,
        };
        entity.frames.remask(&entity.body, map);
        entity
    }

    /// Advances animation and movement by `increment` ticks, then refreshes
    /// visibility against `view`. An increment of zero freezes the entity.
    pub(crate) fn update(&mut self, view: Rect, ctx: &mut UpdateContext<'_>, increment: u32) {
        if self.to_remove {
            return;
        }
        let mut finished_opening = false;
        match &mut self.behaviour {
            Behaviour::Scenery | Behaviour::Pickup => {
                if self.in_view {
                    self.frames.tick(increment);
                }
            }
            Behaviour::Door { opening } => {
                finished_opening =
                    *opening && self.frames.tick(increment) && self.frames.index() == 0;
            }
            Behaviour::Baddie(strategy) => {
                if increment > 0 {
                    self.frames.tick(increment);
                    let step = strategy.next_step(
                        self.body.position(),
                        self.body.level,
                        self.in_view,
                        &ctx.player,
                    );
                    if let Some(facing) = step.facing {
                        self.frames.set_row(facing.row());
                    }
                    if step.launched {
                        ctx.notifier.notify(Notification::WaspZooming);
                    }
                    self.body.translate(step.dx, step.dy);
                    self.frames.remask(&self.body, ctx.map);
                    if !ctx.map.pixel_rect().intersects(&self.body.map_rect) {
                        debug!(uid = %self.uid, "sprite_left_map");
                        self.to_remove = true;
                    }
                }
            }
        }
        if finished_opening {
            self.finish_opening(ctx);
        }
        self.in_view = self.body.map_rect.intersects(&view);
    }

    /// Whether the player footprint touches this entity on its level.
    pub(crate) fn touches(&self, footprint: &Rect, level: engine::Level) -> bool {
        !self.to_remove && self.body.level == level && self.body.base_rect.intersects(footprint)
    }

    /// Picks up a coin or key. Returns what was collected.
    pub(crate) fn collect(&mut self, registry: &mut Registry) -> Option<Notification> {
        if self.behaviour != Behaviour::Pickup || self.to_remove {
            return None;
        }
        let (record, notification) = match self.kind {
            SpriteKind::Coin => {
                registry.add_coin();
                (WorldRecord::Coin { collected: true }, Notification::CoinCollected)
            }
            SpriteKind::Key => {
                registry.add_key();
                (WorldRecord::Key { collected: true }, Notification::KeyCollected)
            }
            _ => return None,
        };
        registry.record(self.uid.clone(), record);
        self.to_remove = true;
        debug!(uid = %self.uid, coins = registry.coins(), keys = registry.keys(), "pickup_collected");
        Some(notification)
    }

    /// Starts opening a door, spending one key. False when this is not a
    /// closed door or no key is held.
    pub(crate) fn try_open(&mut self, registry: &mut Registry) -> bool {
        match &mut self.behaviour {
            Behaviour::Door { opening } if !*opening && registry.take_key() => {
                *opening = true;
                true
            }
            _ => false,
        }
    }

    fn finish_opening(&mut self, ctx: &mut UpdateContext<'_>) {
        let record = WorldRecord::Door {
            tile: self.tile,
            level: self.body.level,
            open: true,
        };
        record.apply_map_actions(ctx.map);
        ctx.registry.record(self.uid.clone(), record);
        self.to_remove = true;
        info!(uid = %self.uid, "door_opened");
    }
}
