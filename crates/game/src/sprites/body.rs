use engine::{Level, Rect};

use crate::world::constants::{BASE_RECT_EXTEND, BASE_RECT_HEIGHT, TILE_SIZE};

/// Where an entity is: its image rect on the map, the footprint used for
/// every walkability, trigger and collision test, its level and draw depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Body {
    pub(crate) map_rect: Rect,
    pub(crate) base_rect: Rect,
    pub(crate) level: Level,
    pub(crate) z: i32,
    base_width: Option<i32>,
}

impl Body {
    /// A `width x height` body at the map origin. The footprint spans
    /// `base_width` (the full width when `None`), centred horizontally, and
    /// hangs just below the image bottom.
    pub(crate) fn new(width: i32, height: i32, base_width: Option<i32>) -> Self {
        let map_rect = Rect::from_size(width, height);
        let mut body = Self {
            map_rect,
            base_rect: footprint(map_rect, base_width),
            level: 0.0,
            z: 0,
            base_width,
        };
        body.update_z();
        body
    }

    pub(crate) fn position(&self) -> (i32, i32) {
        self.map_rect.top_left()
    }

    pub(crate) fn place(&mut self, px: i32, py: i32, level: Level) {
        self.map_rect.move_to(px, py);
        self.base_rect = footprint(self.map_rect, self.base_width);
        self.level = level;
        self.update_z();
    }

    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.map_rect.translate(dx, dy);
        self.base_rect.translate(dx, dy);
        self.update_z();
    }

    pub(crate) fn set_level(&mut self, level: Level) {
        self.level = level;
        self.update_z();
    }

    fn update_z(&mut self) {
        self.z = (self.base_rect.bottom() as Level + self.level * TILE_SIZE as Level) as i32;
    }
}

fn footprint(map_rect: Rect, base_width: Option<i32>) -> Rect {
    let width = base_width.unwrap_or(map_rect.width);
    Rect::new(
        map_rect.left() + (map_rect.width - width) / 2,
        map_rect.bottom() + BASE_RECT_EXTEND - BASE_RECT_HEIGHT,
        width,
        BASE_RECT_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_is_centred_and_hangs_below_the_image() {
        let body = Body::new(32, 48, Some(16));
        assert_eq!(
            body.base_rect,
            Rect::new(8, 48 + BASE_RECT_EXTEND - BASE_RECT_HEIGHT, 16, BASE_RECT_HEIGHT)
        );
    }

    #[test]
    fn z_combines_footprint_bottom_and_level() {
        let mut body = Body::new(32, 32, None);
        body.place(0, 100, 2.0);
        assert_eq!(body.z, 132 + BASE_RECT_EXTEND + 2 * TILE_SIZE);

        body.translate(4, -2);
        assert_eq!(body.map_rect.top_left(), (4, 98));
        assert_eq!(body.z, 130 + BASE_RECT_EXTEND + 2 * TILE_SIZE);
    }

    #[test]
    fn fractional_level_truncates_z() {
        let mut body = Body::new(32, 32, None);
        body.place(0, 0, 1.5);
        assert_eq!(body.z, 32 + BASE_RECT_EXTEND + TILE_SIZE + TILE_SIZE / 2);
    }
}
