//! Receiver of decoded device commands
//!
//! [`crate::DeviceSession`] calls one method per decoded command. Coordinates
//! are exactly as sent by the device; renderer-specific offsets are the
//! sink's business.

use m8_protocol::{KeyState, Rgb, SystemInfo};

/// Callbacks for everything the device streams to the host
pub trait Sink {
    /// Fill a rectangle. The session has already resolved a repeated color.
    fn on_draw_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Rgb);

    /// Draw one character cell
    fn on_draw_char(&mut self, code: u8, x: u16, y: u16, fg: Rgb, bg: Rgb);

    /// Draw the oscilloscope strip
    ///
    /// `x`/`y` is the origin of the strip region; the session always passes
    /// `(0, 0)` and sinks right-align the strip against the screen edge.
    fn on_draw_waveform(&mut self, x: u16, y: u16, color: Rgb, samples: &[u8]);

    /// Key bitfield reported by the device
    fn on_key_pressed(&mut self, keys: KeyState);

    /// Hardware model, firmware and font reported by the device
    fn on_system_info(&mut self, info: &SystemInfo);

    /// The session dropped the connection
    fn on_disconnect(&mut self);
}
