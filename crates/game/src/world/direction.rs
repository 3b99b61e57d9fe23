use std::fmt;

use engine::{InputAction, InputSnapshot};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 8,
        }
    }

    /// Row of a four-row frame sheet showing this facing.
    pub(crate) const fn row(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub(crate) const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub(crate) const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub(crate) fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Held movement keys as `Direction::bit` flags.
pub(crate) fn direction_bits(input: &InputSnapshot) -> u8 {
    [
        (InputAction::MoveUp, Direction::Up),
        (InputAction::MoveDown, Direction::Down),
        (InputAction::MoveLeft, Direction::Left),
        (InputAction::MoveRight, Direction::Right),
    ]
    .into_iter()
    .filter(|(action, _)| input.is_down(*action))
    .fold(0, |bits, (_, direction)| bits | direction.bit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_bits_combines_held_keys() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveLeft, true);
        assert_eq!(direction_bits(&input), Direction::Up.bit() | Direction::Left.bit());
        assert_eq!(direction_bits(&InputSnapshot::empty()), 0);
    }

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(Direction::parse("LEFT"), Some(Direction::Left));
        assert_eq!(Direction::parse("north"), None);
    }
}
