//! Host → device commands
//!
//! Outbound commands are not SLIP framed: an ASCII tag followed by a fixed
//! number of argument bytes.

use heapless::Vec;

use crate::device::Rgb;
use crate::keys::KeyState;

// Command tags
pub const TAG_CONTROL_KEYS: u8 = b'C';
pub const TAG_KEYJAZZ: u8 = b'K';
pub const TAG_ENABLE_DISPLAY: u8 = b'E';
pub const TAG_RESET_DISPLAY: u8 = b'R';
pub const TAG_DISABLE_DISPLAY: u8 = b'D';
pub const TAG_THEME_COLOR: u8 = b'S';
pub const TAG_PING: u8 = b'X';

/// Longest encoded host command (theme color)
pub const MAX_HOST_COMMAND_SIZE: usize = 5;

/// Number of theme color slots on the device
pub const THEME_COLOR_COUNT: u8 = 13;

/// Commands sent from the host to the M8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Replace the device's key state
    ControlKeys(KeyState),
    /// Play a note
    KeyJazz { note: u8, velocity: u8 },
    /// Start streaming display commands
    EnableDisplay,
    /// Redraw the whole screen
    ResetDisplay,
    /// Stop streaming; also sent before the host lets go of the port
    DisableDisplay,
    /// Set one theme color; the device ignores indices past 12 and redraws
    ThemeColor { index: u8, color: Rgb },
    /// Keepalive
    Ping,
}

impl HostCommand {
    /// Encode this command into its wire bytes
    pub fn encode(&self) -> Vec<u8, MAX_HOST_COMMAND_SIZE> {
        let bytes = match *self {
            HostCommand::ControlKeys(keys) => Vec::from_slice(&[TAG_CONTROL_KEYS, keys.bits()]),
            HostCommand::KeyJazz { note, velocity } => {
                Vec::from_slice(&[TAG_KEYJAZZ, note, velocity])
            }
            HostCommand::EnableDisplay => Vec::from_slice(&[TAG_ENABLE_DISPLAY]),
            HostCommand::ResetDisplay => Vec::from_slice(&[TAG_RESET_DISPLAY]),
            HostCommand::DisableDisplay => Vec::from_slice(&[TAG_DISABLE_DISPLAY]),
            HostCommand::ThemeColor { index, color } => {
                Vec::from_slice(&[TAG_THEME_COLOR, index, color.r, color.g, color.b])
            }
            HostCommand::Ping => Vec::from_slice(&[TAG_PING]),
        };
        // capacity covers the longest variant
        bytes.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_control_keys() {
        let cmd = HostCommand::ControlKeys(KeyState::from_bits(0x81));
        assert_eq!(cmd.encode(), [b'C', 0x81]);
    }

    #[test]
    fn test_encode_keyjazz() {
        let cmd = HostCommand::KeyJazz {
            note: 60,
            velocity: 100,
        };
        assert_eq!(cmd.encode(), [b'K', 60, 100]);
    }

    #[test]
    fn test_encode_theme_color() {
        let cmd = HostCommand::ThemeColor {
            index: 4,
            color: Rgb::new(0x10, 0x20, 0x30),
        };
        assert_eq!(cmd.encode(), [b'S', 4, 0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_encode_single_byte_commands() {
        assert_eq!(HostCommand::EnableDisplay.encode(), [b'E']);
        assert_eq!(HostCommand::ResetDisplay.encode(), [b'R']);
        assert_eq!(HostCommand::DisableDisplay.encode(), [b'D']);
        assert_eq!(HostCommand::Ping.encode(), [b'X']);
    }
}
