use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::geometry::Rect;
use crate::surface::Surface;

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Presents a logical-size game frame in the window, scaled by the largest
/// whole factor that fits and centred with black bars.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub fn present(&mut self, frame: &Surface) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let target = self.pixels.frame_mut();
        for chunk in target.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
        let placement = letterbox(frame.width(), frame.height(), self.width, self.height);
        blit_scaled(target, self.width, frame, placement);
        self.pixels.render()
    }
}

/// Destination rect for a `source` sized image inside a `target` sized
/// window. The scale is a whole number of at least one, so pixel art stays
/// crisp; the image may be cropped when the window is smaller than it.
pub fn letterbox(source_width: u32, source_height: u32, target_width: u32, target_height: u32) -> Rect {
    if source_width == 0 || source_height == 0 {
        return Rect::default();
    }
    let scale = (target_width / source_width)
        .min(target_height / source_height)
        .max(1);
    let width = (source_width * scale) as i32;
    let height = (source_height * scale) as i32;
    Rect::new(
        (target_width as i32 - width) / 2,
        (target_height as i32 - height) / 2,
        width,
        height,
    )
}

fn blit_scaled(target: &mut [u8], target_width: u32, frame: &Surface, placement: Rect) {
    let target_height = (target.len() / 4) as u32 / target_width.max(1);
    let bounds = Rect::from_size(target_width as i32, target_height as i32);
    let Some(visible) = placement.intersection(&bounds) else {
        return;
    };
    let scale = (placement.width / frame.width().max(1) as i32).max(1);
    let source = frame.as_rgba();
    let source_stride = frame.width() as usize * 4;

    for y in visible.top()..visible.bottom() {
        let source_y = ((y - placement.top()) / scale) as usize;
        let row_start = y as usize * target_width as usize * 4;
        for x in visible.left()..visible.right() {
            let source_x = ((x - placement.left()) / scale) as usize;
            let from = source_y * source_stride + source_x * 4;
            let to = row_start + x as usize * 4;
            target[to..to + 4].copy_from_slice(&source[from..from + 4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_uses_largest_whole_scale() {
        assert_eq!(letterbox(640, 512, 1280, 1024), Rect::new(0, 0, 1280, 1024));
        assert_eq!(letterbox(640, 512, 1400, 1100), Rect::new(60, 38, 1280, 1024));
    }

    #[test]
    fn letterbox_never_scales_below_one() {
        assert_eq!(letterbox(640, 512, 600, 500), Rect::new(-20, -6, 640, 512));
    }

    #[test]
    fn blit_scaled_repeats_source_pixels() {
        let mut frame = Surface::new(2, 1);
        frame.put_pixel(0, 0, [255, 0, 0, 255]);
        frame.put_pixel(1, 0, [0, 0, 255, 255]);
        let mut target = vec![0u8; 4 * 2 * 4];
        let placement = letterbox(2, 1, 4, 2);

        blit_scaled(&mut target, 4, &frame, placement);

        assert_eq!(&target[0..4], &[255, 0, 0, 255]);
        assert_eq!(&target[4..8], &[255, 0, 0, 255]);
        assert_eq!(&target[8..12], &[0, 0, 255, 255]);
        assert_eq!(&target[16..20], &[255, 0, 0, 255]);
    }

    #[test]
    fn blit_scaled_crops_to_target() {
        let frame = Surface::filled(4, 4, [9, 9, 9, 255]);
        let mut target = vec![0u8; 4 * 2 * 2];
        let placement = letterbox(4, 4, 2, 2);

        blit_scaled(&mut target, 2, &frame, placement);

        assert!(target.chunks_exact(4).all(|pixel| pixel == [9, 9, 9, 255]));
    }
}
