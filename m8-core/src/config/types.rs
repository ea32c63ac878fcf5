//! Configuration type definitions

use core::time::Duration;

use heapless::Vec;
use m8_hal::PortInfo;
use m8_protocol::EscapePolicy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Teensy vendor id used by the M8
pub const M8_VID: u16 = 0x16C0;
/// Product id of the standard (stereo) firmware
pub const M8_PID_STEREO: u16 = 0x048A;
/// Product id of the multichannel audio firmware
pub const M8_PID_MULTICHANNEL: u16 = 0x048B;

/// Maximum accepted USB identities
pub const MAX_ACCEPTED_DEVICES: usize = 4;

/// Maximum entries in the swatch size table
pub const MAX_SWATCH_SIZES: usize = 8;

/// Rect sizes the device UI uses for theme color swatches
pub const DEFAULT_SWATCH_SIZES: [(u16, u16); 4] = [(24, 7), (30, 9), (36, 11), (45, 13)];

/// USB identity of an M8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceSignature {
    pub vid: u16,
    pub pid: u16,
}

impl DeviceSignature {
    pub const STEREO: DeviceSignature = DeviceSignature {
        vid: M8_VID,
        pid: M8_PID_STEREO,
    };
    pub const MULTICHANNEL: DeviceSignature = DeviceSignature {
        vid: M8_VID,
        pid: M8_PID_MULTICHANNEL,
    };
}

/// Session tuning
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Consecutive empty reads before the idle probe runs
    pub idle_threshold: u32,
    /// Bound on each outbound write (ms)
    pub write_timeout_ms: u32,
    /// Pause between disabling and re-enabling the display on connect (ms)
    pub settle_delay_ms: u32,
    /// Transport reads per `read()` call
    pub max_reads_per_poll: u16,
    /// Codec behavior after an invalid escape
    pub escape_policy: EscapePolicy,
    /// USB identities `connect` accepts without `force`
    pub accepted_devices: Vec<DeviceSignature, MAX_ACCEPTED_DEVICES>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut accepted_devices = Vec::new();
        // capacity is larger than the two built-in ids
        let _ = accepted_devices.push(DeviceSignature::STEREO);
        let _ = accepted_devices.push(DeviceSignature::MULTICHANNEL);
        Self {
            idle_threshold: 1024,
            write_timeout_ms: 10,
            settle_delay_ms: 100,
            max_reads_per_poll: 16,
            escape_policy: EscapePolicy::Preserve,
            accepted_devices,
        }
    }
}

impl SessionConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.write_timeout_ms))
    }

    /// Whether `port` carries one of the accepted USB identities
    pub fn accepts(&self, port: &PortInfo) -> bool {
        port.usb.is_some_and(|usb| {
            self.accepted_devices
                .iter()
                .any(|sig| sig.vid == usb.vid && sig.pid == usb.pid)
        })
    }
}

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Alpha given to pixels in the background color
    pub background_alpha: u8,
    /// (w, h) of rects treated as theme color swatches
    pub swatch_sizes: Vec<(u16, u16), MAX_SWATCH_SIZES>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            background_alpha: 255,
            swatch_sizes: Vec::from_slice(&DEFAULT_SWATCH_SIZES).unwrap_or_default(),
        }
    }
}

/// Everything a host persists
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    pub session: SessionConfig,
    pub display: DisplayConfig,
}
