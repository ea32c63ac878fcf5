//! Device session driver
//!
//! [`DeviceSession`] owns an open port, feeds everything it reads through
//! the SLIP codec and command decoder, and hands each command to a [`Sink`].
//! It also watches for a silent link: after `idle_threshold` consecutive
//! empty reads it checks whether the device is still enumerable and either
//! pings it or drops the connection.

use alloc::string::String;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use m8_hal::{LinkConfig, PortEnumerator, SerialPort, TransportError};
use m8_protocol::{
    Command, CommandDecoder, EscapePolicy, FirmwareVersion, FontSelector, FrameCodec, FrameEvent,
    FramingError, HardwareModel, HostCommand, Key, KeyState, Rgb, SystemInfo,
};

use super::state::{SessionEvent, SessionState};
use crate::config::SessionConfig;
use crate::error::{ConnectionError, SessionError};
use crate::sink::Sink;

/// Bytes requested from the transport per read
pub const READ_CHUNK_SIZE: usize = 1024;

/// A connection to one M8
///
/// Generic over the port enumerator, the command sink and the delay source
/// used for the handshake settle time.
pub struct DeviceSession<E: PortEnumerator, S: Sink, D: DelayNs> {
    enumerator: E,
    sink: S,
    delay: D,
    config: SessionConfig,
    state: SessionState,
    port: Option<E::Port>,
    /// Name of the open port, used by the idle probe
    port_name: Option<String>,
    codec: FrameCodec,
    decoder: CommandDecoder,
    /// Set after an overflow; the frame in progress is dropped at its END
    discard_frame: bool,
    zero_reads: u32,
    /// Color reused by the short draw rect encodings
    last_color: Rgb,
    system: Option<SystemInfo>,
    keys: KeyState,
    read_buf: [u8; READ_CHUNK_SIZE],
}

impl<E: PortEnumerator, S: Sink, D: DelayNs> DeviceSession<E, S, D> {
    /// Create a disconnected session
    pub fn new(enumerator: E, sink: S, delay: D, config: SessionConfig) -> Self {
        Self {
            enumerator,
            sink,
            delay,
            codec: FrameCodec::with_policy(config.escape_policy),
            config,
            state: SessionState::Disconnected,
            port: None,
            port_name: None,
            decoder: CommandDecoder::new(),
            discard_frame: false,
            zero_reads: 0,
            last_color: Rgb::BLACK,
            system: None,
            keys: KeyState::default(),
            read_buf: [0; READ_CHUNK_SIZE],
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Name of the port the session holds open
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Model from the last system info, if any arrived on this connection
    pub fn model(&self) -> Option<HardwareModel> {
        self.system.map(|info| info.model)
    }

    pub fn font(&self) -> Option<FontSelector> {
        self.system.map(|info| info.font)
    }

    pub fn firmware(&self) -> Option<FirmwareVersion> {
        self.system.map(|info| info.firmware)
    }

    /// Keys the host currently reports as held
    pub fn keys(&self) -> KeyState {
        self.keys
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys.is_pressed(key)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Disconnect and hand back the sink
    pub fn into_sink(mut self) -> S {
        self.disconnect();
        self.sink
    }

    /// Names of enumerable ports that look like an M8
    pub fn list_devices(&mut self) -> Result<Vec<String>, SessionError> {
        let ports = self.enumerator.available_ports()?;
        Ok(ports
            .into_iter()
            .filter(|port| self.config.accepts(port))
            .map(|port| port.name)
            .collect())
    }

    /// Open `target` and start display streaming
    ///
    /// An empty `target` picks the first accepted device. With `force`, the
    /// USB identity check is skipped. Connecting while connected is a no-op.
    /// On failure the session stays disconnected.
    pub fn connect(&mut self, target: &str, force: bool) -> Result<(), SessionError> {
        if self.state.is_connected() {
            return Ok(());
        }

        self.state = self.state.transition(SessionEvent::ConnectRequested);
        match self.open_and_handshake(target, force) {
            Ok((name, port)) => {
                info!("connected to {}", name.as_str());
                self.reset_decode_state();
                self.port = Some(port);
                self.port_name = Some(name);
                self.state = self.state.transition(SessionEvent::HandshakeComplete);
                Ok(())
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                self.state = self.state.transition(SessionEvent::ConnectFailed);
                Err(e)
            }
        }
    }

    fn open_and_handshake(
        &mut self,
        target: &str,
        force: bool,
    ) -> Result<(String, E::Port), SessionError> {
        let ports = self.enumerator.available_ports()?;
        let info = ports
            .into_iter()
            .find(|port| {
                (target.is_empty() || port.name == target) && (force || self.config.accepts(port))
            })
            .ok_or(ConnectionError::DeviceNotFound)?;

        let mut port = self.enumerator.open(&info.name, &LinkConfig::default())?;
        if let Err(e) = self.handshake(&mut port) {
            port.close();
            return Err(e.into());
        }
        Ok((info.name, port))
    }

    /// Disable, settle, enable, reset
    fn handshake(&mut self, port: &mut E::Port) -> Result<(), TransportError> {
        let timeout = self.config.write_timeout();
        port.write_timeout(&HostCommand::DisableDisplay.encode(), timeout)?;
        self.delay.delay_ms(self.config.settle_delay_ms);
        port.write_timeout(&HostCommand::EnableDisplay.encode(), timeout)?;
        port.write_timeout(&HostCommand::ResetDisplay.encode(), timeout)?;
        debug!("handshake complete");
        Ok(())
    }

    /// Drop the connection. Safe to call in any state.
    pub fn disconnect(&mut self) {
        self.drop_connection(SessionEvent::DisconnectRequested);
    }

    fn drop_connection(&mut self, event: SessionEvent) {
        if let Some(mut port) = self.port.take() {
            let disable = HostCommand::DisableDisplay.encode();
            if let Err(e) = port.write_timeout(&disable, self.config.write_timeout()) {
                debug!("disable display on disconnect failed: {}", e);
            }
            self.sink.on_disconnect();
            port.close();
            info!("disconnected ({:?})", event);
        }
        self.state = self.state.transition(event);
        self.reset_decode_state();
    }

    fn reset_decode_state(&mut self) {
        self.codec.reset();
        self.discard_frame = false;
        self.zero_reads = 0;
        self.last_color = Rgb::BLACK;
        self.system = None;
        self.keys = KeyState::default();
        self.port_name = None;
    }

    /// Drain what the transport has buffered and dispatch complete commands
    ///
    /// Performs at most `max_reads_per_poll` reads and stops at the first
    /// empty one. Returns the number of bytes consumed. A read error drops
    /// the connection and is returned; an idle timeout drops it and returns
    /// normally.
    pub fn read(&mut self) -> Result<usize, SessionError> {
        if self.port.is_none() {
            return Err(SessionError::NotConnected);
        }

        let mut total = 0;
        for _ in 0..self.config.max_reads_per_poll.max(1) {
            let Some(port) = self.port.as_mut() else {
                break;
            };
            let n = match port.read_nonblocking(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) => {
                    error!("read failed: {}", e);
                    self.drop_connection(SessionEvent::TransportLost);
                    return Err(e.into());
                }
            };

            if n == 0 {
                // data earlier in this poll already proved the link alive
                if total == 0 {
                    self.zero_reads = self.zero_reads.saturating_add(1);
                    if self.zero_reads >= self.config.idle_threshold {
                        self.probe_idle();
                    }
                }
                break;
            }

            self.zero_reads = 0;
            total += n;
            self.process_bytes(n);
        }
        Ok(total)
    }

    /// Device went quiet: ping it if it is still there, drop it otherwise
    fn probe_idle(&mut self) {
        self.zero_reads = 0;

        let present = match self.enumerator.available_ports() {
            Ok(ports) => ports
                .iter()
                .any(|port| Some(port.name.as_str()) == self.port_name.as_deref()),
            Err(e) => {
                warn!("enumeration during idle probe failed: {}", e);
                false
            }
        };

        if !present {
            warn!(
                "no data after {} reads and device is gone",
                self.config.idle_threshold
            );
            self.drop_connection(SessionEvent::IdleTimeout);
            return;
        }

        match self.send(HostCommand::Ping) {
            Ok(()) => debug!("link idle, keepalive sent"),
            Err(e) => {
                warn!("keepalive failed: {}", e);
                self.drop_connection(SessionEvent::IdleTimeout);
            }
        }
    }

    fn process_bytes(&mut self, n: usize) {
        let Self {
            codec,
            decoder,
            sink,
            discard_frame,
            last_color,
            system,
            read_buf,
            ..
        } = self;

        for &byte in &read_buf[..n] {
            match codec.feed(byte) {
                FrameEvent::None => {}
                FrameEvent::FrameReady(frame) => {
                    if core::mem::take(discard_frame) {
                        trace!("dropped overflowed frame");
                        continue;
                    }
                    if frame.is_empty() {
                        continue;
                    }
                    dispatch(sink, last_color, system, decoder.decode(frame));
                }
                FrameEvent::Error(FramingError::Overflow) => {
                    if !*discard_frame {
                        warn!("framing error: {}", FramingError::Overflow);
                        *discard_frame = true;
                    }
                }
                FrameEvent::Error(e) => {
                    warn!("framing error: {}", e);
                    // resync drops the broken frame without a FrameReady
                    if codec.policy() == EscapePolicy::Resync {
                        *discard_frame = false;
                    }
                }
            }
        }
    }

    /// Write one host command
    ///
    /// Failures are returned but leave the connection up.
    pub fn send(&mut self, command: HostCommand) -> Result<(), SessionError> {
        let port = self.port.as_mut().ok_or(SessionError::NotConnected)?;
        port.write_timeout(&command.encode(), self.config.write_timeout())
            .map_err(|e| {
                warn!("write of {:?} failed: {}", command, e);
                SessionError::from(e)
            })
    }

    /// Replace the host key state and send it
    ///
    /// Holding all four direction keys makes the device stop streaming, so
    /// that chord is answered with a display reset instead of the keys.
    pub fn set_keys(&mut self, keys: KeyState) -> Result<(), SessionError> {
        self.keys = keys;
        if keys.is_direction_chord() {
            debug!("direction chord held, resetting display");
            self.send(HostCommand::ResetDisplay)
        } else {
            self.send(HostCommand::ControlKeys(keys))
        }
    }

    /// Press or release one key; nothing is sent if it is already in that state
    pub fn set_key_pressed(&mut self, key: Key, pressed: bool) -> Result<(), SessionError> {
        if self.keys.is_pressed(key) == pressed {
            return Ok(());
        }
        let mut keys = self.keys;
        keys.set_pressed(key, pressed);
        self.set_keys(keys)
    }

    pub fn send_keyjazz(&mut self, note: u8, velocity: u8) -> Result<(), SessionError> {
        self.send(HostCommand::KeyJazz { note, velocity })
    }

    pub fn send_theme_color(&mut self, index: u8, color: Rgb) -> Result<(), SessionError> {
        self.send(HostCommand::ThemeColor { index, color })
    }

    pub fn enable_display(&mut self) -> Result<(), SessionError> {
        self.send(HostCommand::EnableDisplay)
    }

    pub fn reset_display(&mut self) -> Result<(), SessionError> {
        self.send(HostCommand::ResetDisplay)
    }

    pub fn disable_display(&mut self) -> Result<(), SessionError> {
        self.send(HostCommand::DisableDisplay)
    }

    pub fn ping(&mut self) -> Result<(), SessionError> {
        self.send(HostCommand::Ping)
    }
}

fn dispatch<S: Sink>(
    sink: &mut S,
    last_color: &mut Rgb,
    system: &mut Option<SystemInfo>,
    command: Command<'_>,
) {
    match command {
        Command::DrawRect { x, y, w, h, color } => {
            let color = color.unwrap_or(*last_color);
            *last_color = color;
            sink.on_draw_rect(x, y, w, h, color);
        }
        Command::DrawChar { code, x, y, fg, bg } => sink.on_draw_char(code, x, y, fg, bg),
        Command::DrawWaveform { color, samples } => sink.on_draw_waveform(0, 0, color, samples),
        Command::KeyPress(keys) => sink.on_key_pressed(keys),
        Command::SystemInfo(info) => {
            let previous = system.map(|s| (s.model, s.font));
            if previous != Some((info.model, info.font)) {
                info!(
                    "device is {} firmware {} font {:?}",
                    info.model.name(),
                    info.firmware,
                    info.font
                );
            }
            *system = Some(info);
            sink.on_system_info(&info);
        }
        Command::Invalid(e) => warn!("dropping frame: {}", e),
    }
}
