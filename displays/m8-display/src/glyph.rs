//! Monochrome glyph sheets
//!
//! A sheet holds the 128 ASCII glyphs of one font laid out as a 16×8 grid
//! of equally sized cells. Hosts load sheets from whatever image format they
//! ship the fonts in; the buffer only needs a bit per pixel.

use alloc::vec;
use alloc::vec::Vec;

/// Glyph cells per sheet row
pub const SHEET_COLUMNS: u16 = 16;
/// Glyph cell rows per sheet
pub const SHEET_ROWS: u16 = 8;

/// Errors building a [`GlyphSheet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GlyphError {
    /// Sheet is not a whole 16×8 grid of non-empty cells
    InvalidDimensions { width: u16, height: u16 },
    /// Fewer bytes than the dimensions require
    DataTooShort { expected: usize, actual: usize },
}

impl core::fmt::Display for GlyphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GlyphError::InvalidDimensions { width, height } => {
                write!(f, "{}x{} is not a 16x8 glyph grid", width, height)
            }
            GlyphError::DataTooShort { expected, actual } => {
                write!(f, "glyph data too short: need {} bytes, got {}", expected, actual)
            }
        }
    }
}

/// One bit per pixel, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSheet {
    width: u16,
    height: u16,
    bits: Vec<bool>,
}

impl GlyphSheet {
    fn check_dimensions(width: u16, height: u16) -> Result<(), GlyphError> {
        let whole_grid = width % SHEET_COLUMNS == 0 && height % SHEET_ROWS == 0;
        if width == 0 || height == 0 || !whole_grid {
            return Err(GlyphError::InvalidDimensions { width, height });
        }
        Ok(())
    }

    /// Build from packed bits: row-major, most significant bit first, rows
    /// not padded
    pub fn from_packed(width: u16, height: u16, data: &[u8]) -> Result<Self, GlyphError> {
        Self::check_dimensions(width, height)?;
        let count = usize::from(width) * usize::from(height);
        let expected = count.div_ceil(8);
        if data.len() < expected {
            return Err(GlyphError::DataTooShort {
                expected,
                actual: data.len(),
            });
        }
        let bits = (0..count)
            .map(|i| data[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Build from RGBA8 image data
    ///
    /// Font images draw glyphs on black; a pixel is set when it is opaque
    /// and not black.
    pub fn from_rgba(width: u16, height: u16, rgba: &[u8]) -> Result<Self, GlyphError> {
        Self::check_dimensions(width, height)?;
        let expected = usize::from(width) * usize::from(height) * 4;
        if rgba.len() < expected {
            return Err(GlyphError::DataTooShort {
                expected,
                actual: rgba.len(),
            });
        }
        let bits = rgba[..expected]
            .chunks_exact(4)
            .map(|px| px[3] != 0 && (px[0] | px[1] | px[2]) != 0)
            .collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Build an empty sheet for a given glyph cell size
    pub fn blank(char_width: u8, char_height: u8) -> Result<Self, GlyphError> {
        let width = u16::from(char_width) * SHEET_COLUMNS;
        let height = u16::from(char_height) * SHEET_ROWS;
        Self::check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            bits: vec![false; usize::from(width) * usize::from(height)],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Size of one glyph cell
    pub fn cell_size(&self) -> (u16, u16) {
        (self.width / SHEET_COLUMNS, self.height / SHEET_ROWS)
    }

    /// Pixel state; outside the sheet reads as unset
    pub fn get_bit(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    pub fn set_bit(&mut self, x: u16, y: u16, set: bool) {
        if x < self.width && y < self.height {
            self.bits[usize::from(y) * usize::from(self.width) + usize::from(x)] = set;
        }
    }

    /// Top-left corner of the cell for `code`
    pub fn cell_origin(&self, code: u8) -> (u16, u16) {
        let (cw, ch) = self.cell_size();
        let code = u16::from(code);
        ((code % SHEET_COLUMNS) * cw, (code / SHEET_COLUMNS) * ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_packed_msb_first() {
        // 16x8 sheet of 1x1 cells, 16 bytes
        let mut data = [0u8; 16];
        data[0] = 0b1000_0001;
        let sheet = GlyphSheet::from_packed(16, 8, &data).unwrap();
        assert!(sheet.get_bit(0, 0));
        assert!(!sheet.get_bit(1, 0));
        assert!(sheet.get_bit(7, 0));
        assert!(!sheet.get_bit(8, 0));
        assert_eq!(sheet.cell_size(), (1, 1));
    }

    #[test]
    fn test_from_rgba_black_is_unset() {
        let mut rgba = vec![0u8; 16 * 8 * 4];
        // opaque white
        rgba[0..4].copy_from_slice(&[255, 255, 255, 255]);
        // opaque black
        rgba[4..8].copy_from_slice(&[0, 0, 0, 255]);
        // transparent white
        rgba[8..12].copy_from_slice(&[255, 255, 255, 0]);
        let sheet = GlyphSheet::from_rgba(16, 8, &rgba).unwrap();
        assert!(sheet.get_bit(0, 0));
        assert!(!sheet.get_bit(1, 0));
        assert!(!sheet.get_bit(2, 0));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            GlyphSheet::from_packed(15, 8, &[0; 16]),
            Err(GlyphError::InvalidDimensions {
                width: 15,
                height: 8
            })
        );
        assert_eq!(
            GlyphSheet::from_packed(16, 8, &[0; 15]),
            Err(GlyphError::DataTooShort {
                expected: 16,
                actual: 15
            })
        );
        assert!(GlyphSheet::blank(0, 7).is_err());
    }

    #[test]
    fn test_cell_origin() {
        let sheet = GlyphSheet::blank(5, 7).unwrap();
        assert_eq!(sheet.cell_size(), (5, 7));
        assert_eq!(sheet.cell_origin(b'A'), ((65 % 16) * 5, (65 / 16) * 7));
        assert!(!sheet.get_bit(1000, 0));
    }
}
