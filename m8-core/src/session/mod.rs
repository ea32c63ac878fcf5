//! Device session
//!
//! The connection lifecycle is a pure state machine ([`SessionState`]);
//! [`DeviceSession`] owns the transport and drives it.

mod device;
mod state;

pub use device::{DeviceSession, READ_CHUNK_SIZE};
pub use state::{SessionEvent, SessionState};
