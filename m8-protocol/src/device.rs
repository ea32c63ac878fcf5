//! Device vocabulary shared by the codec, the session and renderers

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 8-bit RGB color as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Read three consecutive bytes as r, g, b
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

/// M8 hardware revision reported in the system info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum HardwareModel {
    Headless = 0,
    Beta = 1,
    #[default]
    Model01 = 2,
    Model02 = 3,
}

impl HardwareModel {
    /// Native resolution of the model 01, beta and headless firmware
    pub const RESOLUTION_MODEL_01: (u16, u16) = (320, 240);
    /// Native resolution of the model 02
    pub const RESOLUTION_MODEL_02: (u16, u16) = (480, 320);

    /// Parse a model byte; unknown values are treated as headless
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => HardwareModel::Beta,
            0x02 => HardwareModel::Model01,
            0x03 => HardwareModel::Model02,
            _ => HardwareModel::Headless,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Screen size in pixels as (width, height)
    pub const fn resolution(self) -> (u16, u16) {
        match self {
            HardwareModel::Model02 => Self::RESOLUTION_MODEL_02,
            _ => Self::RESOLUTION_MODEL_01,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            HardwareModel::Headless => "Headless",
            HardwareModel::Beta => "Beta",
            HardwareModel::Model01 => "Model:01",
            HardwareModel::Model02 => "Model:02",
        }
    }
}

/// Font selected in the device's display settings
///
/// `Large` is the big font on the model 01 and the bold font on the model 02.
/// `Huge` only exists on the model 02.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FontSelector {
    #[default]
    Small = 0,
    Large = 1,
    Huge = 2,
}

impl FontSelector {
    /// Parse a font byte for the given model
    ///
    /// Values the model cannot display fall back to `Small`.
    pub fn from_byte(model: HardwareModel, byte: u8) -> Self {
        match (model, byte) {
            (_, 0x01) => FontSelector::Large,
            (HardwareModel::Model02, 0x02) => FontSelector::Huge,
            _ => FontSelector::Small,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Firmware version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl core::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Payload of the system info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemInfo {
    pub model: HardwareModel,
    pub firmware: FirmwareVersion,
    pub font: FontSelector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_model_resolution() {
        assert_eq!(HardwareModel::Model02.resolution(), (480, 320));
        assert_eq!(HardwareModel::Model01.resolution(), (320, 240));
        assert_eq!(HardwareModel::Beta.resolution(), (320, 240));
        assert_eq!(HardwareModel::Headless.resolution(), (320, 240));
    }

    #[test]
    fn test_unknown_model_is_headless() {
        assert_eq!(HardwareModel::from_byte(0x7F), HardwareModel::Headless);
        assert_eq!(HardwareModel::from_byte(3), HardwareModel::Model02);
    }

    #[test]
    fn test_huge_font_only_on_model_02() {
        assert_eq!(
            FontSelector::from_byte(HardwareModel::Model02, 2),
            FontSelector::Huge
        );
        assert_eq!(
            FontSelector::from_byte(HardwareModel::Model01, 2),
            FontSelector::Small
        );
        assert_eq!(
            FontSelector::from_byte(HardwareModel::Model01, 1),
            FontSelector::Large
        );
    }

    #[test]
    fn test_firmware_display() {
        let fw = FirmwareVersion {
            major: 6,
            minor: 0,
            patch: 2,
        };
        assert_eq!(fw.to_string(), "6.0.2");
    }
}
