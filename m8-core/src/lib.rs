//! Board-agnostic session logic for the M8 remote display link
//!
//! This crate sits between the transport traits in `m8-hal` and a renderer:
//!
//! - [`Sink`] - Callbacks a renderer implements to receive decoded commands
//! - [`session`] - Connection state machine and [`DeviceSession`]
//! - [`config`] - Session and display configuration types
//! - [`error`] - Connection and session errors

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

// must come first so the logging macros are visible to the other modules
mod fmt;

pub mod config;
pub mod error;
pub mod session;
pub mod sink;

pub use config::{ClientConfig, DeviceSignature, DisplayConfig, SessionConfig};
pub use error::{ConnectionError, SessionError};
pub use session::{DeviceSession, SessionEvent, SessionState};
pub use sink::Sink;
