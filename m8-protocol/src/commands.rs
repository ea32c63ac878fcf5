//! Device → host commands
//!
//! Every frame starts with an opcode byte. Draw rect has four wire sizes
//! that shorten the command when the color repeats or the rect is a single
//! pixel; all other commands have a fixed size or a bounded range.
//! Multi-byte coordinates are little-endian u16.

use crate::device::{FirmwareVersion, FontSelector, HardwareModel, Rgb, SystemInfo};
use crate::keys::KeyState;

// Opcodes
pub const OP_DRAW_RECT: u8 = 0xFE;
pub const OP_DRAW_CHAR: u8 = 0xFD;
pub const OP_DRAW_WAVEFORM: u8 = 0xFC;
pub const OP_KEY_PRESS: u8 = 0xFB;
pub const OP_SYSTEM_INFO: u8 = 0xFF;

// Frame sizes, opcode included
pub const DRAW_RECT_SIZE_FULL: usize = 12;
pub const DRAW_RECT_SIZE_NO_COLOR: usize = 9;
pub const DRAW_RECT_SIZE_POINT: usize = 8;
pub const DRAW_RECT_SIZE_POINT_NO_COLOR: usize = 5;
pub const DRAW_CHAR_SIZE: usize = 12;
pub const DRAW_WAVEFORM_SIZE_MIN: usize = 1 + 3;
pub const DRAW_WAVEFORM_SIZE_MAX: usize = 1 + 3 + MAX_WAVEFORM_SAMPLES;
pub const KEY_PRESS_SIZE: usize = 3;
pub const SYSTEM_INFO_SIZE: usize = 6;

/// Widest waveform the device draws
pub const MAX_WAVEFORM_SAMPLES: usize = 480;

/// Reasons a complete frame could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame had no opcode byte
    Empty,
    /// Known opcode with a length it never uses
    WrongSize { opcode: u8, len: usize },
    /// Opcode is not part of the protocol
    UnknownOpcode(u8),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty frame"),
            DecodeError::WrongSize { opcode, len } => {
                write!(f, "opcode {:#04X} with invalid length {}", opcode, len)
            }
            DecodeError::UnknownOpcode(opcode) => write!(f, "unknown opcode {:#04X}", opcode),
        }
    }
}

/// A decoded device command
///
/// Borrows waveform samples from the frame it was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Fill a rectangle; `color` is `None` when the previous color repeats
    DrawRect {
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        color: Option<Rgb>,
    },
    /// Draw one glyph cell
    DrawChar {
        code: u8,
        x: u16,
        y: u16,
        fg: Rgb,
        bg: Rgb,
    },
    /// Oscilloscope strip in the top-right corner
    DrawWaveform { color: Rgb, samples: &'a [u8] },
    /// Key bitfield changed on the device
    KeyPress(KeyState),
    /// Hardware model, firmware and font
    SystemInfo(SystemInfo),
    /// Frame could not be decoded
    Invalid(DecodeError),
}

/// Stateless frame decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandDecoder;

impl CommandDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one unescaped frame
    pub fn decode<'a>(&self, frame: &'a [u8]) -> Command<'a> {
        match Self::try_decode(frame) {
            Ok(command) => command,
            Err(e) => Command::Invalid(e),
        }
    }

    fn try_decode(frame: &[u8]) -> Result<Command<'_>, DecodeError> {
        let (&opcode, _) = frame.split_first().ok_or(DecodeError::Empty)?;
        let len = frame.len();
        let wrong_size = DecodeError::WrongSize { opcode, len };

        match opcode {
            OP_DRAW_RECT => {
                let x = read_u16(frame, 1);
                let y = read_u16(frame, 3);
                match len {
                    DRAW_RECT_SIZE_FULL => Ok(Command::DrawRect {
                        x,
                        y,
                        w: read_u16(frame, 5),
                        h: read_u16(frame, 7),
                        color: Some(Rgb::from_bytes(&frame[9..])),
                    }),
                    DRAW_RECT_SIZE_NO_COLOR => Ok(Command::DrawRect {
                        x,
                        y,
                        w: read_u16(frame, 5),
                        h: read_u16(frame, 7),
                        color: None,
                    }),
                    DRAW_RECT_SIZE_POINT => Ok(Command::DrawRect {
                        x,
                        y,
                        w: 1,
                        h: 1,
                        color: Some(Rgb::from_bytes(&frame[5..])),
                    }),
                    DRAW_RECT_SIZE_POINT_NO_COLOR => Ok(Command::DrawRect {
                        x,
                        y,
                        w: 1,
                        h: 1,
                        color: None,
                    }),
                    _ => Err(wrong_size),
                }
            }
            OP_DRAW_CHAR => {
                if len != DRAW_CHAR_SIZE {
                    return Err(wrong_size);
                }
                Ok(Command::DrawChar {
                    code: frame[1],
                    x: read_u16(frame, 2),
                    y: read_u16(frame, 4),
                    fg: Rgb::from_bytes(&frame[6..]),
                    bg: Rgb::from_bytes(&frame[9..]),
                })
            }
            OP_DRAW_WAVEFORM => {
                if !(DRAW_WAVEFORM_SIZE_MIN..=DRAW_WAVEFORM_SIZE_MAX).contains(&len) {
                    return Err(wrong_size);
                }
                Ok(Command::DrawWaveform {
                    color: Rgb::from_bytes(&frame[1..]),
                    samples: &frame[4..],
                })
            }
            OP_KEY_PRESS => {
                if len != KEY_PRESS_SIZE {
                    return Err(wrong_size);
                }
                Ok(Command::KeyPress(KeyState::from_bits(frame[1])))
            }
            OP_SYSTEM_INFO => {
                if len != SYSTEM_INFO_SIZE {
                    return Err(wrong_size);
                }
                let model = HardwareModel::from_byte(frame[1]);
                Ok(Command::SystemInfo(SystemInfo {
                    model,
                    firmware: FirmwareVersion {
                        major: frame[2],
                        minor: frame[3],
                        patch: frame[4],
                    },
                    font: FontSelector::from_byte(model, frame[5]),
                }))
            }
            _ => Err(DecodeError::UnknownOpcode(opcode)),
        }
    }
}

/// Little-endian u16 at `start`; callers check the frame length first
fn read_u16(frame: &[u8], start: usize) -> u16 {
    match frame.get(start..start + 2) {
        Some(bytes) => u16::from(bytes[0]) | (u16::from(bytes[1]) << 8),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(frame: &[u8]) -> Command<'_> {
        CommandDecoder::new().decode(frame)
    }

    #[test]
    fn test_draw_rect_full() {
        let frame = [OP_DRAW_RECT, 10, 0, 20, 0, 5, 0, 5, 0, 255, 0, 0];
        assert_eq!(
            decode(&frame),
            Command::DrawRect {
                x: 10,
                y: 20,
                w: 5,
                h: 5,
                color: Some(Rgb::new(255, 0, 0)),
            }
        );
    }

    #[test]
    fn test_draw_rect_little_endian() {
        let frame = [OP_DRAW_RECT, 0x2C, 0x01, 0xEF, 0x00, 0x40, 0x01, 0x01, 0x00];
        assert_eq!(
            decode(&frame),
            Command::DrawRect {
                x: 300,
                y: 239,
                w: 320,
                h: 1,
                color: None,
            }
        );
    }

    #[test]
    fn test_draw_rect_point_variants() {
        let point = [OP_DRAW_RECT, 1, 0, 2, 0, 9, 8, 7];
        assert_eq!(
            decode(&point),
            Command::DrawRect {
                x: 1,
                y: 2,
                w: 1,
                h: 1,
                color: Some(Rgb::new(9, 8, 7)),
            }
        );

        let point_no_color = [OP_DRAW_RECT, 1, 0, 2, 0];
        assert_eq!(
            decode(&point_no_color),
            Command::DrawRect {
                x: 1,
                y: 2,
                w: 1,
                h: 1,
                color: None,
            }
        );
    }

    #[test]
    fn test_draw_rect_wrong_size() {
        let frame = [OP_DRAW_RECT, 1, 0, 2, 0, 3];
        assert_eq!(
            decode(&frame),
            Command::Invalid(DecodeError::WrongSize {
                opcode: OP_DRAW_RECT,
                len: 6
            })
        );
    }

    #[test]
    fn test_draw_char() {
        let frame = [OP_DRAW_CHAR, b'A', 8, 0, 16, 0, 1, 2, 3, 4, 5, 6];
        assert_eq!(
            decode(&frame),
            Command::DrawChar {
                code: b'A',
                x: 8,
                y: 16,
                fg: Rgb::new(1, 2, 3),
                bg: Rgb::new(4, 5, 6),
            }
        );
    }

    #[test]
    fn test_draw_waveform_bounds() {
        let empty = [OP_DRAW_WAVEFORM, 1, 2, 3];
        assert_eq!(
            decode(&empty),
            Command::DrawWaveform {
                color: Rgb::new(1, 2, 3),
                samples: &[],
            }
        );

        let mut full = [0u8; DRAW_WAVEFORM_SIZE_MAX];
        full[0] = OP_DRAW_WAVEFORM;
        match decode(&full) {
            Command::DrawWaveform { samples, .. } => assert_eq!(samples.len(), 480),
            other => panic!("unexpected {:?}", other),
        }

        let mut too_long = [0u8; DRAW_WAVEFORM_SIZE_MAX + 1];
        too_long[0] = OP_DRAW_WAVEFORM;
        assert!(matches!(
            decode(&too_long),
            Command::Invalid(DecodeError::WrongSize { .. })
        ));
        assert!(matches!(
            decode(&[OP_DRAW_WAVEFORM, 1, 2]),
            Command::Invalid(DecodeError::WrongSize { .. })
        ));
    }

    #[test]
    fn test_key_press() {
        assert_eq!(
            decode(&[OP_KEY_PRESS, 0b0100_1000, 0]),
            Command::KeyPress(KeyState::from_bits(0b0100_1000))
        );
        assert!(matches!(
            decode(&[OP_KEY_PRESS, 1]),
            Command::Invalid(DecodeError::WrongSize { .. })
        ));
    }

    #[test]
    fn test_system_info() {
        assert_eq!(
            decode(&[OP_SYSTEM_INFO, 3, 1, 2, 3, 0]),
            Command::SystemInfo(SystemInfo {
                model: HardwareModel::Model02,
                firmware: FirmwareVersion {
                    major: 1,
                    minor: 2,
                    patch: 3
                },
                font: FontSelector::Small,
            })
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            decode(&[0x42, 1, 2]),
            Command::Invalid(DecodeError::UnknownOpcode(0x42))
        );
        assert_eq!(decode(&[]), Command::Invalid(DecodeError::Empty));
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(frame in proptest::collection::vec(any::<u8>(), 0..600)) {
            let _ = decode(&frame);
        }
    }
}
