//! Counters drawn over the Play view: coins, lives and keys.

use std::sync::Arc;

use engine::{AssetCache, AssetKind, Surface};

use crate::world::constants::SCALAR;

const COIN_ICON: &str = "small-coin.png";
const DIGITS: &str = "numbers.png";
const LIFE_ICON: &str = "life.png";
const KEY_ICON: &str = "small-key.png";

const MARGIN: i32 = 3 * SCALAR;
const ICON_SPACING: i32 = 8 * SCALAR;
const COIN_ICON_X: i32 = 27 * SCALAR;
const COIN_COUNT_X: i32 = 38 * SCALAR;

#[derive(Debug, Clone)]
pub(crate) struct Hud {
    coin_icon: Option<Arc<Surface>>,
    /// Glyphs 0 through 9, cut from one strip.
    digits: Vec<Surface>,
    life_icon: Option<Arc<Surface>>,
    key_icon: Option<Arc<Surface>>,
    lives: i32,
    view_width: i32,
}

impl Hud {
    /// Missing art leaves that part of the HUD blank.
    pub(crate) fn load(assets: &mut AssetCache, view_width: i32, lives: i32) -> Self {
        let digits = assets
            .optional_image(AssetKind::Sprite, DIGITS)
            .map(|strip| strip.slice_grid(10, 1))
            .unwrap_or_default();
        Self {
            coin_icon: assets.optional_image(AssetKind::Sprite, COIN_ICON),
            digits,
            life_icon: assets.optional_image(AssetKind::Sprite, LIFE_ICON),
            key_icon: assets.optional_image(AssetKind::Sprite, KEY_ICON),
            lives,
            view_width,
        }
    }

    pub(crate) fn lives(&self) -> i32 {
        self.lives
    }

    pub(crate) fn reset(&mut self, lives: i32) {
        self.lives = lives;
    }

    /// Takes a life. True when none were left, which ends the game.
    pub(crate) fn lose_life(&mut self) -> bool {
        self.lives -= 1;
        self.lives < 0
    }

    pub(crate) fn draw(&self, target: &mut Surface, coins: u32, keys: u32) {
        if let Some(icon) = &self.coin_icon {
            target.blit(icon, COIN_ICON_X, MARGIN);
        }
        if !self.digits.is_empty() {
            for (index, digit) in coins.to_string().bytes().enumerate() {
                let glyph = &self.digits[usize::from(digit - b'0')];
                target.blit(glyph, COIN_COUNT_X + index as i32 * glyph.width() as i32, MARGIN);
            }
        }
        if let Some(icon) = &self.life_icon {
            for index in 0..self.lives.max(0) {
                target.blit(icon, MARGIN + index * ICON_SPACING, MARGIN);
            }
        }
        if let Some(icon) = &self.key_icon {
            let keys = keys as i32;
            let left = self.view_width - MARGIN - keys * ICON_SPACING;
            for index in 0..keys {
                target.blit(icon, left + index * ICON_SPACING, MARGIN);
            }
        }
    }
}
