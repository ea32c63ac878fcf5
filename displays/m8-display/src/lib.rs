//! Software renderer for the M8 remote display
//!
//! [`DisplayBuffer`] implements [`m8_core::Sink`] and mirrors the device
//! screen into an RGBA8 pixel store that a host can upload as a texture.
//!
//! - [`geometry`] - Per model/font offsets and glyph cell sizes
//! - [`glyph`] - Monochrome font sheets
//! - [`theme`] - Theme palette capture from swatch draws
//! - [`buffer`] - The pixel store and its draw command handling

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod fmt;

pub mod buffer;
pub mod geometry;
pub mod glyph;
pub mod theme;

pub use buffer::{DisplayBuffer, DisplayEvent};
pub use geometry::{FontGeometry, FontKind};
pub use glyph::{GlyphError, GlyphSheet};
pub use theme::{SwatchTable, ThemePalette, PALETTE_SIZE};
