//! M8 link hardware abstraction layer
//!
//! This crate defines the transport traits the session drives. Hosts
//! implement them on top of their serial library of choice; the session and
//! renderer never touch an OS port directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  m8-core (DeviceSession)                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  m8-hal (this crate - traits)           │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ host serial   │       │ mock (tests)  │
//! │ backend       │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::PortEnumerator`] - Port discovery and opening
//! - [`serial::SerialPort`] - Non-blocking reads, bounded writes

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod serial;

// Re-export key traits at crate root for convenience
pub use serial::{
    DataBits, FlowControl, LinkConfig, Parity, PortEnumerator, PortInfo, SerialPort, StopBits,
    TransportError, UsbIds,
};
