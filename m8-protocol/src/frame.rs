//! SLIP frame decoding for the M8 display protocol.
//!
//! Frame format:
//! - payload bytes, with `END` and `ESC` replaced by two-byte escapes
//! - END (1 byte): 0xC0 terminates the frame
//!
//! There is no length field or checksum; the command opcode and its size
//! are validated by [`crate::commands`] once a frame is complete.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frame terminator
pub const END: u8 = 0xC0;
/// Escape introducer
pub const ESC: u8 = 0xDB;
/// Escaped `END`
pub const ESC_END: u8 = 0xDC;
/// Escaped `ESC`
pub const ESC_ESC: u8 = 0xDD;

/// Maximum number of unescaped bytes held for one command
pub const CMD_BUFFER_SIZE: usize = 1024;

/// Errors that can occur while deframing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// Command buffer is full; the byte was not stored
    Overflow,
    /// Byte following `ESC` was neither `ESC_END` nor `ESC_ESC`
    InvalidEscape,
}

impl core::fmt::Display for FramingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FramingError::Overflow => write!(f, "command buffer overflow"),
            FramingError::InvalidEscape => write!(f, "invalid SLIP escape sequence"),
        }
    }
}

/// What the codec does after an invalid escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EscapePolicy {
    /// Keep the escape flag set and the partial frame intact.
    ///
    /// Matches the reference device client: every following byte is still
    /// interpreted as an escape until `ESC_END`/`ESC_ESC` arrives, so the
    /// stream can stay desynchronized for a while.
    #[default]
    Preserve,
    /// Drop the partial frame and skip bytes until the next `END`
    Resync,
}

/// Result of feeding one byte to the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent<'a> {
    /// More bytes needed
    None,
    /// An `END` byte closed the frame; the slice is the unescaped payload
    FrameReady(&'a [u8]),
    /// The byte could not be processed
    Error(FramingError),
}

/// Byte-at-a-time SLIP deframer
///
/// Holds at most [`CMD_BUFFER_SIZE`] unescaped bytes. A completed frame stays
/// readable through the returned [`FrameEvent::FrameReady`] slice and is
/// cleared when the next byte is fed.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    buffer: Vec<u8, CMD_BUFFER_SIZE>,
    escaped: bool,
    frame_complete: bool,
    discarding: bool,
    policy: EscapePolicy,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Create a codec using [`EscapePolicy::Preserve`]
    pub fn new() -> Self {
        Self::with_policy(EscapePolicy::Preserve)
    }

    /// Create a codec with an explicit invalid-escape policy
    pub fn with_policy(policy: EscapePolicy) -> Self {
        Self {
            buffer: Vec::new(),
            escaped: false,
            frame_complete: false,
            discarding: false,
            policy,
        }
    }

    pub fn policy(&self) -> EscapePolicy {
        self.policy
    }

    /// Drop any partial frame and clear the escape state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.escaped = false;
        self.frame_complete = false;
        self.discarding = false;
    }

    /// Whether the last byte fed was an unresolved `ESC`
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Bytes accumulated for the frame in progress
    pub fn pending(&self) -> &[u8] {
        if self.frame_complete {
            &[]
        } else {
            &self.buffer
        }
    }

    /// Feed a single byte to the codec
    pub fn feed(&mut self, byte: u8) -> FrameEvent<'_> {
        if self.frame_complete {
            self.buffer.clear();
            self.frame_complete = false;
        }

        if self.discarding {
            if byte == END {
                self.discarding = false;
            }
            return FrameEvent::None;
        }

        if !self.escaped {
            match byte {
                END => {
                    self.frame_complete = true;
                    FrameEvent::FrameReady(&self.buffer)
                }
                ESC => {
                    self.escaped = true;
                    FrameEvent::None
                }
                _ => self.append(byte),
            }
        } else {
            match byte {
                ESC_END => {
                    self.escaped = false;
                    self.append(END)
                }
                ESC_ESC => {
                    self.escaped = false;
                    self.append(ESC)
                }
                _ => {
                    if self.policy == EscapePolicy::Resync {
                        self.buffer.clear();
                        self.escaped = false;
                        // an END here already closed the broken frame
                        self.discarding = byte != END;
                    }
                    FrameEvent::Error(FramingError::InvalidEscape)
                }
            }
        }
    }

    fn append(&mut self, byte: u8) -> FrameEvent<'static> {
        match self.buffer.push(byte) {
            Ok(()) => FrameEvent::None,
            Err(_) => FrameEvent::Error(FramingError::Overflow),
        }
    }
}

/// SLIP-encode `payload` into `out`, terminated with `END`
///
/// Returns the number of bytes written.
pub fn encode_frame(payload: &[u8], out: &mut [u8]) -> Result<usize, FramingError> {
    let mut len = 0;
    let mut put = |byte: u8, len: &mut usize| -> Result<(), FramingError> {
        let slot = out.get_mut(*len).ok_or(FramingError::Overflow)?;
        *slot = byte;
        *len += 1;
        Ok(())
    };

    for &byte in payload {
        match byte {
            END => {
                put(ESC, &mut len)?;
                put(ESC_END, &mut len)?;
            }
            ESC => {
                put(ESC, &mut len)?;
                put(ESC_ESC, &mut len)?;
            }
            _ => put(byte, &mut len)?,
        }
    }
    put(END, &mut len)?;

    Ok(len)
}
