//! Error types
//!
//! Framing and decode problems never reach the caller; they are logged and
//! the stream carries on. What surfaces here is the transport failing or the
//! device not being there.

use m8_hal::TransportError;

/// Reasons `connect` could not reach a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionError {
    /// No enumerated port matched the target name and accepted devices
    DeviceNotFound,
}

impl core::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConnectionError::DeviceNotFound => write!(f, "no matching M8 device found"),
        }
    }
}

/// Errors returned by [`crate::DeviceSession`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// The serial backend failed
    Transport(TransportError),
    /// The device could not be found or opened
    Connection(ConnectionError),
    /// The operation needs an open connection
    NotConnected,
}

impl From<TransportError> for SessionError {
    fn from(e: TransportError) -> Self {
        SessionError::Transport(e)
    }
}

impl From<ConnectionError> for SessionError {
    fn from(e: ConnectionError) -> Self {
        SessionError::Connection(e)
    }
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::Transport(e) => write!(f, "transport error: {}", e),
            SessionError::Connection(e) => write!(f, "connection error: {}", e),
            SessionError::NotConnected => write!(f, "not connected"),
        }
    }
}
