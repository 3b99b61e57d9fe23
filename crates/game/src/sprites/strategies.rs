//! How baddies choose their next step.

use engine::{Level, Rect};

use crate::world::constants::SCALAR;
use crate::world::Direction;

const ZOOM_COUNTDOWN: u32 = 8;

/// What a baddie knows about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Observer {
    pub(crate) base_rect: Rect,
    pub(crate) level: Level,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) dx: i32,
    pub(crate) dy: i32,
    pub(crate) facing: Option<Direction>,
    /// Set on the tick a wasp launches.
    pub(crate) launched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MovementStrategy {
    Robot(RobotPath),
    Zoom(ZoomWatch),
}

impl MovementStrategy {
    pub(crate) fn next_step(
        &mut self,
        position: (i32, i32),
        level: Level,
        in_view: bool,
        player: &Observer,
    ) -> Step {
        match self {
            MovementStrategy::Robot(path) => path.next_step(position),
            MovementStrategy::Zoom(watch) => watch.next_step(level, in_view, player),
        }
    }
}

/// Walks a closed loop of pixel waypoints, one axis step per tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RobotPath {
    points: Vec<(i32, i32)>,
    target: usize,
}

impl RobotPath {
    pub(crate) fn new(points: Vec<(i32, i32)>) -> Self {
        Self { points, target: 0 }
    }

    fn next_step(&mut self, (x, y): (i32, i32)) -> Step {
        if self.points.is_empty() {
            return Step::default();
        }
        if self.points[self.target] == (x, y) {
            self.target = (self.target + 1) % self.points.len();
        }
        let (tx, ty) = self.points[self.target];
        let dx = (tx - x).signum() * SCALAR;
        let dy = (ty - y).signum() * SCALAR;
        let mut facing = match dx.signum() {
            -1 => Some(Direction::Left),
            1 => Some(Direction::Right),
            _ => None,
        };
        match dy.signum() {
            -1 => facing = Some(Direction::Up),
            1 => facing = Some(Direction::Down),
            _ => {}
        }
        Step {
            dx,
            dy,
            facing,
            launched: false,
        }
    }
}

/// Waits for the player to enter one of four view-sized lanes around the
/// spawn point, then counts down and flies straight along that lane.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZoomWatch {
    lanes: [(Direction, Rect); 4],
    direction: Option<Direction>,
    countdown: u32,
}

impl ZoomWatch {
    pub(crate) fn new(base_rect: Rect, view_width: i32, view_height: i32) -> Self {
        let lanes = [
            (
                Direction::Left,
                Rect::new(base_rect.left() - view_width, base_rect.top(), view_width, base_rect.height),
            ),
            (
                Direction::Right,
                Rect::new(base_rect.right(), base_rect.top(), view_width, base_rect.height),
            ),
            (
                Direction::Up,
                Rect::new(base_rect.left(), base_rect.top() - view_height, base_rect.width, view_height),
            ),
            (
                Direction::Down,
                Rect::new(base_rect.left(), base_rect.bottom(), base_rect.width, view_height),
            ),
        ];
        Self {
            lanes,
            direction: None,
            countdown: ZOOM_COUNTDOWN,
        }
    }

    fn next_step(&mut self, level: Level, in_view: bool, player: &Observer) -> Step {
        let Some(direction) = self.direction else {
            if in_view && level == player.level {
                self.direction = self
                    .lanes
                    .iter()
                    .find(|(_, lane)| lane.intersects(&player.base_rect))
                    .map(|(direction, _)| *direction);
            }
            return Step {
                facing: self.direction,
                ..Step::default()
            };
        };
        if self.countdown > 0 {
            self.countdown -= 1;
            return Step {
                launched: self.countdown == 0,
                ..Step::default()
            };
        }
        let (ux, uy) = direction.delta();
        Step {
            dx: ux * 2 * SCALAR,
            dy: uy * 2 * SCALAR,
            facing: Some(direction),
            launched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer_at(x: i32, y: i32) -> Observer {
        Observer {
            base_rect: Rect::new(x, y, 16, 18),
            level: 1.0,
        }
    }

    #[test]
    fn robot_path_walks_to_each_waypoint_in_turn() {
        let mut path = RobotPath::new(vec![(0, 0), (4, 0)]);

        let step = path.next_step((0, 0));
        assert_eq!((step.dx, step.dy, step.facing), (SCALAR, 0, Some(Direction::Right)));
        let step = path.next_step((4, 0));
        assert_eq!((step.dx, step.facing), (-SCALAR, Some(Direction::Left)));
    }

    #[test]
    fn robot_vertical_step_overrides_facing() {
        let mut path = RobotPath::new(vec![(0, 0), (6, 6)]);
        let step = path.next_step((0, 0));
        assert_eq!((step.dx, step.dy), (SCALAR, SCALAR));
        assert_eq!(step.facing, Some(Direction::Down));
    }

    #[test]
    fn zoom_waits_for_countdown_then_flies() {
        let mut watch = ZoomWatch::new(Rect::new(100, 100, 32, 18), 640, 512);
        let player = observer_at(300, 100);

        let spotted = watch.next_step(1.0, true, &player);
        assert_eq!(spotted.facing, Some(Direction::Right));
        let waiting: Vec<Step> = (0..ZOOM_COUNTDOWN)
            .map(|_| watch.next_step(1.0, true, &player))
            .collect();
        assert!(waiting.iter().all(|step| step.dx == 0));
        assert_eq!(waiting.iter().filter(|step| step.launched).count(), 1);
        assert!(waiting[ZOOM_COUNTDOWN as usize - 1].launched);
        assert_eq!(watch.next_step(1.0, true, &player).dx, 2 * SCALAR);
    }

    #[test]
    fn zoom_ignores_player_on_another_level_or_out_of_view() {
        let mut watch = ZoomWatch::new(Rect::new(100, 100, 32, 18), 640, 512);
        let mut player = observer_at(100, 300);
        assert_eq!(watch.next_step(1.0, false, &player).facing, None);
        player.level = 2.0;
        assert_eq!(watch.next_step(1.0, true, &player).facing, None);
        player.level = 1.0;
        assert_eq!(watch.next_step(1.0, true, &player).facing, Some(Direction::Down));
    }
}
