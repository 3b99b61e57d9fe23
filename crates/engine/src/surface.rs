use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::geometry::Rect;

pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("rgba buffer for {width}x{height} surface has {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Owned RGBA8 pixel buffer.
///
/// Pixels with alpha 0 are treated as transparent by [`Surface::blit`] and
/// friends; everything else is copied verbatim (no blending).
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(SurfaceError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Decodes a PNG, scales it by an integer factor and optionally maps one
    /// colour to full transparency.
    pub fn load(path: &Path, scale: u32, color_key: Option<[u8; 3]>) -> Result<Self, SurfaceError> {
        let reader = ImageReader::open(path).map_err(|source| SurfaceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| SurfaceError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        let mut surface = Self::from_rgba(image.width(), image.height(), image.into_raw())?;
        if let Some(key) = color_key {
            surface.apply_color_key(key);
        }
        Ok(surface.scaled(scale))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.byte_offset(x, y)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.byte_offset(x, y) {
            self.rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let Some(clipped) = rect.intersection(&self.rect()) else {
            return;
        };
        for y in clipped.top()..clipped.bottom() {
            for x in clipped.left()..clipped.right() {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Overwrites every pixel with the matching pixel of `source`. Used to
    /// restore a working copy from its pristine original.
    pub fn copy_from(&mut self, source: &Surface) {
        if source.width == self.width && source.height == self.height {
            self.rgba.copy_from_slice(&source.rgba);
        } else {
            self.fill(TRANSPARENT);
            self.blit_opaque(source, 0, 0);
        }
    }

    /// Draws `source` with its top-left corner at `(x, y)`, skipping fully
    /// transparent source pixels and clipping against this surface.
    pub fn blit(&mut self, source: &Surface, x: i32, y: i32) {
        self.blit_region_inner(source, source.rect(), x, y, true);
    }

    /// Like [`Surface::blit`] but copies transparent pixels too.
    pub fn blit_opaque(&mut self, source: &Surface, x: i32, y: i32) {
        self.blit_region_inner(source, source.rect(), x, y, false);
    }

    /// Copies the `region` of `source` (clipped to the source bounds) to
    /// `(x, y)`, transparent pixels included.
    pub fn blit_region(&mut self, source: &Surface, region: Rect, x: i32, y: i32) {
        self.blit_region_inner(source, region, x, y, false);
    }

    fn blit_region_inner(
        &mut self,
        source: &Surface,
        region: Rect,
        x: i32,
        y: i32,
        skip_transparent: bool,
    ) {
        let Some(src) = region.intersection(&source.rect()) else {
            return;
        };
        // shift the destination by however much the region was clipped
        let dst_x = x + (src.left() - region.left());
        let dst_y = y + (src.top() - region.top());
        let dst = Rect::new(dst_x, dst_y, src.width, src.height);
        let Some(visible) = dst.intersection(&self.rect()) else {
            return;
        };

        let row_len = visible.width as usize * 4;
        for out_y in visible.top()..visible.bottom() {
            let src_y = src.top() + (out_y - dst.top());
            let src_x = src.left() + (visible.left() - dst.left());
            let (Some(src_offset), Some(dst_offset)) = (
                source.byte_offset(src_x, src_y),
                self.byte_offset(visible.left(), out_y),
            ) else {
                continue;
            };
            let src_row = &source.rgba[src_offset..src_offset + row_len];
            let dst_row = &mut self.rgba[dst_offset..dst_offset + row_len];
            if skip_transparent {
                for (dst_px, src_px) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                    if src_px[3] != 0 {
                        dst_px.copy_from_slice(src_px);
                    }
                }
            } else {
                dst_row.copy_from_slice(src_row);
            }
        }
    }

    /// Returns a new surface holding `region`; areas outside this surface
    /// come back transparent.
    pub fn copy_region(&self, region: Rect) -> Surface {
        let width = region.width.max(0) as u32;
        let height = region.height.max(0) as u32;
        let mut out = Surface::new(width, height);
        out.blit_region(self, region, 0, 0);
        out
    }

    /// Nearest-neighbour integer upscale. A factor of 0 or 1 returns a copy.
    #[must_use]
    pub fn scaled(&self, factor: u32) -> Surface {
        if factor <= 1 {
            return self.clone();
        }
        let width = self.width * factor;
        let height = self.height * factor;
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for out_y in 0..height {
            let src_row = (out_y / factor) as usize * self.width as usize * 4;
            for out_x in 0..width {
                let src = src_row + (out_x / factor) as usize * 4;
                rgba.extend_from_slice(&self.rgba[src..src + 4]);
            }
        }
        Surface {
            width,
            height,
            rgba,
        }
    }

    /// Makes every pixel matching `key` (ignoring alpha) fully transparent.
    pub fn apply_color_key(&mut self, key: [u8; 3]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            if chunk[..3] == key {
                chunk.copy_from_slice(&TRANSPARENT);
            }
        }
    }

    /// Cuts the surface into `columns x rows` equally sized cells, row by row.
    pub fn slice_grid(&self, columns: u32, rows: u32) -> Vec<Surface> {
        if columns == 0 || rows == 0 {
            return Vec::new();
        }
        let cell_width = (self.width / columns) as i32;
        let cell_height = (self.height / rows) as i32;
        let mut cells = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows as i32 {
            for column in 0..columns as i32 {
                cells.push(self.copy_region(Rect::new(
                    column * cell_width,
                    row * cell_height,
                    cell_width,
                    cell_height,
                )));
            }
        }
        cells
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        pixel.checked_mul(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn from_rgba_rejects_wrong_buffer_length() {
        let result = Surface::from_rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(SurfaceError::BufferSizeMismatch {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn blit_skips_transparent_pixels() {
        let mut target = Surface::filled(4, 4, BLUE);
        let mut sprite = Surface::new(2, 2);
        sprite.put_pixel(0, 0, RED);

        target.blit(&sprite, 1, 1);

        assert_eq!(target.pixel(1, 1), Some(RED));
        assert_eq!(target.pixel(2, 1), Some(BLUE));
        assert_eq!(target.pixel(2, 2), Some(BLUE));
    }

    #[test]
    fn blit_clips_at_negative_offsets() {
        let mut target = Surface::filled(4, 4, BLUE);
        let sprite = Surface::filled(3, 3, RED);

        target.blit(&sprite, -2, -2);

        assert_eq!(target.pixel(0, 0), Some(RED));
        assert_eq!(target.pixel(1, 0), Some(BLUE));
        assert_eq!(target.pixel(0, 1), Some(BLUE));
    }

    #[test]
    fn blit_region_copies_only_requested_area() {
        let mut source = Surface::filled(4, 4, BLUE);
        source.fill_rect(Rect::new(2, 2, 2, 2), RED);
        let mut target = Surface::new(2, 2);

        target.blit_region(&source, Rect::new(2, 2, 2, 2), 0, 0);

        assert_eq!(target, Surface::filled(2, 2, RED));
    }

    #[test]
    fn copy_region_outside_bounds_is_transparent() {
        let source = Surface::filled(2, 2, RED);
        let copy = source.copy_region(Rect::new(-1, 0, 2, 2));

        assert_eq!(copy.pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(copy.pixel(1, 0), Some(RED));
    }

    #[test]
    fn scaled_repeats_each_pixel() {
        let mut source = Surface::new(2, 1);
        source.put_pixel(0, 0, RED);
        source.put_pixel(1, 0, BLUE);

        let scaled = source.scaled(2);

        assert_eq!((scaled.width(), scaled.height()), (4, 2));
        assert_eq!(scaled.pixel(1, 1), Some(RED));
        assert_eq!(scaled.pixel(2, 0), Some(BLUE));
    }

    #[test]
    fn color_key_clears_matching_pixels() {
        let mut surface = Surface::filled(2, 1, [0, 255, 0, 255]);
        surface.put_pixel(1, 0, RED);

        surface.apply_color_key([0, 255, 0]);

        assert_eq!(surface.pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(surface.pixel(1, 0), Some(RED));
    }

    #[test]
    fn slice_grid_returns_cells_row_major() {
        let mut sheet = Surface::new(4, 2);
        sheet.fill_rect(Rect::new(2, 0, 2, 1), RED);
        sheet.fill_rect(Rect::new(0, 1, 2, 1), BLUE);

        let cells = sheet.slice_grid(2, 2);

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[1], Surface::filled(2, 1, RED));
        assert_eq!(cells[2], Surface::filled(2, 1, BLUE));
    }

    #[test]
    fn copy_from_restores_original_pixels() {
        let original = Surface::filled(3, 3, BLUE);
        let mut working = original.clone();
        working.fill_rect(Rect::new(0, 0, 2, 2), RED);

        working.copy_from(&original);

        assert_eq!(working, original);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = Surface::load(Path::new("definitely/not/here.png"), 1, None);
        assert!(matches!(result, Err(SurfaceError::Open { .. })));
    }
}
