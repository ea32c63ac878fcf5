//! Session state machine
//!
//! Connection state is a function of the current state and an event. The
//! session applies side effects (opening ports, notifying the sink) and then
//! asks the state machine where it ended up.

/// Connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No transport held
    #[default]
    Disconnected,
    /// Port opened, handshake in progress
    Connecting,
    /// Handshake done, device streaming
    Connected,
}

/// Events that move the session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Host asked to connect
    ConnectRequested,
    /// Disable/enable/reset sequence written
    HandshakeComplete,
    /// No matching port, open failed or handshake write failed
    ConnectFailed,
    /// Host asked to disconnect
    DisconnectRequested,
    /// A read reported a transport error
    TransportLost,
    /// Idle probe found the device gone or could not ping it
    IdleTimeout,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Disconnected, ConnectRequested) => Connecting,

            (Connecting, HandshakeComplete) => Connected,
            (Connecting, ConnectFailed) => Disconnected,
            (Connecting, DisconnectRequested) => Disconnected,
            (Connecting, TransportLost) => Disconnected,

            (Connected, DisconnectRequested) => Disconnected,
            (Connected, TransportLost) => Disconnected,
            (Connected, IdleTimeout) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}
