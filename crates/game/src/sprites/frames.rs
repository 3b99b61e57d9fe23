//! Animation frames and the masking protocol.
//!
//! Maskable entities draw from working copies of their frames. Tile masks
//! nearer the viewer are painted onto the current working frame; before the
//! next mask pass the painted slot is restored from the pristine frame, so a
//! frame never carries masks from an earlier position.

use std::sync::Arc;

use engine::Surface;

use super::body::Body;
use crate::world::constants::TILE_SIZE;
use crate::world::RpgMap;

#[derive(Debug, Clone)]
pub(crate) struct Frames {
    /// Rows of frames; four-row sheets follow `Direction::row`.
    pristine: Vec<Vec<Arc<Surface>>>,
    /// Same shape as `pristine` for maskable entities, empty otherwise.
    working: Vec<Vec<Surface>>,
    row: usize,
    index: usize,
    frame_count: u32,
    frame_skip: u32,
    masked_slot: Option<(usize, usize)>,
}

impl Frames {
    /// Cuts `sheet` into `columns x rows` frames. `None` when the sheet is
    /// too small to hold a single pixel per frame.
    pub(crate) fn from_sheet(
        sheet: &Surface,
        columns: u32,
        rows: u32,
        frame_skip: u32,
        maskable: bool,
    ) -> Option<Self> {
        if columns == 0 || rows == 0 || sheet.width() < columns || sheet.height() < rows {
            return None;
        }
        let cells = sheet.slice_grid(columns, rows);
        let pristine: Vec<Vec<Arc<Surface>>> = cells
            .chunks(columns as usize)
            .map(|row| row.iter().cloned().map(Arc::new).collect())
            .collect();
        let working = if maskable {
            pristine
                .iter()
                .map(|row| row.iter().map(|frame| Surface::clone(frame)).collect())
                .collect()
        } else {
            Vec::new()
        };
        Some(Self {
            pristine,
            working,
            row: 0,
            index: 0,
            frame_count: 0,
            frame_skip: frame_skip.max(1),
            masked_slot: None,
        })
    }

    pub(crate) fn width(&self) -> i32 {
        self.pristine[0][0].width() as i32
    }

    pub(crate) fn height(&self) -> i32 {
        self.pristine[0][0].height() as i32
    }

    pub(crate) fn current(&self) -> &Surface {
        match self.working.get(self.row).and_then(|row| row.get(self.index)) {
            Some(frame) => frame,
            None => &self.pristine[self.row][self.index],
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn len(&self) -> usize {
        self.pristine[self.row].len()
    }

    /// Switches to `row` when the sheet has it.
    pub(crate) fn set_row(&mut self, row: usize) {
        if row < self.pristine.len() {
            self.row = row;
            self.index = self.index.min(self.pristine[row].len() - 1);
        }
    }

    /// Counts `increment` ticks and steps to the next frame every
    /// `frame_skip` ticks. Returns true when the frame changed.
    pub(crate) fn tick(&mut self, increment: u32) -> bool {
        if increment == 0 {
            return false;
        }
        self.frame_count = self.frame_count.wrapping_add(increment);
        if self.frame_count % self.frame_skip != 0 {
            return false;
        }
        self.index = (self.index + 1) % self.len();
        true
    }

    /// Restores the slot last painted with masks, then paints the masks
    /// covering `body` onto the current frame.
    pub(crate) fn remask(&mut self, body: &Body, map: &RpgMap) {
        self.repair();
        if self.working.is_empty() {
            return;
        }
        let masks = map.masks(&body.map_rect, body.level, body.z);
        if masks.is_empty() {
            return;
        }
        let frame = &mut self.working[self.row][self.index];
        for tile in &masks {
            let x = tile.x * TILE_SIZE - body.map_rect.left();
            let y = tile.y * TILE_SIZE - body.map_rect.top();
            for image in &tile.images {
                frame.blit(image, x, y);
            }
        }
        self.masked_slot = Some((self.row, self.index));
    }

    fn repair(&mut self) {
        if let Some((row, index)) = self.masked_slot.take() {
            self.working[row][index].copy_from(&self.pristine[row][index]);
        }
    }
}
