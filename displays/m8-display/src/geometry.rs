//! Per-font drawing geometry
//!
//! The device lays out its screen slightly differently depending on the
//! hardware model and the selected font. Draw commands are offset by
//! `x_offset`/`y_offset`, text additionally by `baseline`, and the
//! oscilloscope strip is `waveform_max` pixels tall.

use m8_protocol::{FontSelector, HardwareModel};

/// Number of distinct device fonts
pub const FONT_KIND_COUNT: usize = 5;

/// A device font, resolved from (model, font selector)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontKind {
    #[default]
    Model01Small,
    Model01Big,
    Model02Small,
    Model02Bold,
    Model02Huge,
}

/// Offsets and sizes for one font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FontGeometry {
    pub x_offset: i16,
    /// Added to the y of every draw command
    pub y_offset: i16,
    /// Added to the y of text on top of `y_offset`
    pub baseline: i16,
    /// Height of the oscilloscope strip
    pub waveform_max: u8,
    /// Glyph cell size on the font sheet
    pub char_width: u8,
    pub char_height: u8,
}

/// Geometry of every font, indexed by [`FontKind::index`]
pub const FONT_GEOMETRY: [FontGeometry; FONT_KIND_COUNT] = [
    // model 01 small
    FontGeometry {
        x_offset: 0,
        y_offset: 0,
        baseline: 3,
        waveform_max: 24,
        char_width: 5,
        char_height: 7,
    },
    // model 01 big
    FontGeometry {
        x_offset: 0,
        y_offset: -40,
        baseline: 4,
        waveform_max: 22,
        char_width: 8,
        char_height: 9,
    },
    // model 02 small
    FontGeometry {
        x_offset: 0,
        y_offset: -2,
        baseline: 5,
        waveform_max: 38,
        char_width: 9,
        char_height: 9,
    },
    // model 02 bold
    FontGeometry {
        x_offset: 0,
        y_offset: -2,
        baseline: 4,
        waveform_max: 38,
        char_width: 10,
        char_height: 10,
    },
    // model 02 huge
    FontGeometry {
        x_offset: 0,
        y_offset: -54,
        baseline: 4,
        waveform_max: 24,
        char_width: 12,
        char_height: 12,
    },
];

impl FontKind {
    pub const ALL: [FontKind; FONT_KIND_COUNT] = [
        FontKind::Model01Small,
        FontKind::Model01Big,
        FontKind::Model02Small,
        FontKind::Model02Bold,
        FontKind::Model02Huge,
    ];

    /// Font the device uses for `font` on `model`
    ///
    /// Everything except the model 02 draws with the model 01 fonts.
    pub fn select(model: HardwareModel, font: FontSelector) -> Self {
        match (model, font) {
            (HardwareModel::Model02, FontSelector::Small) => FontKind::Model02Small,
            (HardwareModel::Model02, FontSelector::Large) => FontKind::Model02Bold,
            (HardwareModel::Model02, FontSelector::Huge) => FontKind::Model02Huge,
            (_, FontSelector::Large) => FontKind::Model01Big,
            _ => FontKind::Model01Small,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn geometry(self) -> &'static FontGeometry {
        &FONT_GEOMETRY[self.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_02_fonts() {
        let g = FontKind::select(HardwareModel::Model02, FontSelector::Small).geometry();
        assert_eq!((g.x_offset, g.y_offset, g.baseline, g.waveform_max), (0, -2, 5, 38));
        let g = FontKind::select(HardwareModel::Model02, FontSelector::Large).geometry();
        assert_eq!((g.y_offset, g.baseline, g.waveform_max), (-2, 4, 38));
        let g = FontKind::select(HardwareModel::Model02, FontSelector::Huge).geometry();
        assert_eq!((g.y_offset, g.baseline, g.waveform_max), (-54, 4, 24));
    }

    #[test]
    fn test_model_01_fonts() {
        let g = FontKind::select(HardwareModel::Model01, FontSelector::Small).geometry();
        assert_eq!((g.y_offset, g.baseline, g.waveform_max), (0, 3, 24));
        let g = FontKind::select(HardwareModel::Model01, FontSelector::Large).geometry();
        assert_eq!((g.y_offset, g.baseline, g.waveform_max), (-40, 4, 22));
    }

    #[test]
    fn test_older_models_share_model_01_fonts() {
        for model in [HardwareModel::Headless, HardwareModel::Beta] {
            assert_eq!(
                FontKind::select(model, FontSelector::Small),
                FontKind::Model01Small
            );
            assert_eq!(
                FontKind::select(model, FontSelector::Large),
                FontKind::Model01Big
            );
        }
    }

    #[test]
    fn test_index_matches_table_order() {
        for (i, kind) in FontKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
