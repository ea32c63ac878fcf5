//! Theme color capture
//!
//! The device never reports its theme directly. While the theme screen is
//! open it draws one small swatch per color, always at a handful of fixed
//! sizes, so the buffer records the color of every swatch-sized rect until
//! it has all of them.

use heapless::Vec;
use m8_core::config::{DisplayConfig, MAX_SWATCH_SIZES};
use m8_protocol::outbound::THEME_COLOR_COUNT;
use m8_protocol::Rgb;

/// Colors in a device theme
pub const PALETTE_SIZE: usize = THEME_COLOR_COUNT as usize;

/// Captured theme colors, in the order the swatches were drawn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePalette {
    colors: Vec<Rgb, PALETTE_SIZE>,
}

impl ThemePalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a swatch color; returns false once the palette is full
    pub fn push(&mut self, color: Rgb) -> bool {
        self.colors.push(color).is_ok()
    }

    pub fn is_complete(&self) -> bool {
        self.colors.is_full()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// All theme colors, falling back while capture is incomplete
    ///
    /// Until every swatch has been seen the palette reads as the background
    /// color followed by white.
    pub fn resolved(&self, background: Rgb) -> [Rgb; PALETTE_SIZE] {
        if self.is_complete() {
            let mut out = [Rgb::BLACK; PALETTE_SIZE];
            out.copy_from_slice(&self.colors);
            out
        } else {
            let mut out = [Rgb::WHITE; PALETTE_SIZE];
            out[0] = background;
            out
        }
    }
}

/// Rect sizes treated as theme swatches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwatchTable {
    sizes: Vec<(u16, u16), MAX_SWATCH_SIZES>,
}

impl Default for SwatchTable {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

impl SwatchTable {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            sizes: config.swatch_sizes.clone(),
        }
    }

    pub fn contains(&self, w: u16, h: u16) -> bool {
        self.sizes.contains(&(w, h))
    }

    pub fn sizes(&self) -> &[(u16, u16)] {
        &self.sizes
    }
}
