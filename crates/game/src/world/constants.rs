/// Pixel multiplier applied to all art and layout coordinates.
pub(crate) const SCALAR: i32 = 2;
pub(crate) const TILE_SIZE: i32 = 16 * SCALAR;
/// Player displacement per tick along each moving axis.
pub(crate) const MOVE_UNIT: i32 = SCALAR;

pub(crate) const BASE_RECT_HEIGHT: i32 = 9 * SCALAR;
/// How far the footprint extends below the bottom of the sprite image.
pub(crate) const BASE_RECT_EXTEND: i32 = SCALAR;

/// Ticks per animation frame.
pub(crate) const FRAME_SKIP: u32 = 6;

/// Pure green marks transparent pixels in all art.
pub(crate) const COLOR_KEY: [u8; 3] = [0, 255, 0];
