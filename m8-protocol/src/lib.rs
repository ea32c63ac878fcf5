//! M8 Remote Display Protocol
//!
//! This crate defines the USB-serial protocol spoken by the M8 tracker when a
//! host mirrors its screen. The device streams draw commands; the host answers
//! with key state, keyjazz notes and display control bytes.
//!
//! # Protocol Overview
//!
//! Device → host commands are SLIP framed:
//! ```text
//! ┌────────┬──────────────────────────┬─────┐
//! │ OPCODE │ PAYLOAD (escaped)        │ END │
//! │ 1B     │ 0–483B                   │ C0  │
//! └────────┴──────────────────────────┴─────┘
//! ```
//!
//! `END` (0xC0) and `ESC` (0xDB) inside a frame are sent as `ESC ESC_END` and
//! `ESC ESC_ESC`. Host → device commands are short unframed byte strings
//! starting with an ASCII tag.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod commands;
pub mod device;
pub mod frame;
pub mod keys;
pub mod outbound;

pub use commands::{Command, CommandDecoder, DecodeError};
pub use device::{FirmwareVersion, FontSelector, HardwareModel, Rgb, SystemInfo};
pub use frame::{
    encode_frame, EscapePolicy, FrameCodec, FrameEvent, FramingError, CMD_BUFFER_SIZE, END, ESC,
    ESC_END, ESC_ESC,
};
pub use keys::{Key, KeyState};
pub use outbound::{HostCommand, MAX_HOST_COMMAND_SIZE};
