//! M8 key bits
//!
//! The device reports its eight keys as one bit each, and accepts the same
//! bitfield back in the control-keys command.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical keys on the M8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Key {
    Left,
    Up,
    Down,
    Shift,
    Play,
    Right,
    Option,
    Edit,
}

// Wire format bits
const KEY_EDIT: u8 = 1 << 0;
const KEY_OPTION: u8 = 1 << 1;
const KEY_RIGHT: u8 = 1 << 2;
const KEY_PLAY: u8 = 1 << 3;
const KEY_SHIFT: u8 = 1 << 4;
const KEY_DOWN: u8 = 1 << 5;
const KEY_UP: u8 = 1 << 6;
const KEY_LEFT: u8 = 1 << 7;

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Left,
        Key::Up,
        Key::Down,
        Key::Shift,
        Key::Play,
        Key::Right,
        Key::Option,
        Key::Edit,
    ];

    /// Bit for this key in the keys bitfield
    pub fn bit(self) -> u8 {
        match self {
            Key::Edit => KEY_EDIT,
            Key::Option => KEY_OPTION,
            Key::Right => KEY_RIGHT,
            Key::Play => KEY_PLAY,
            Key::Shift => KEY_SHIFT,
            Key::Down => KEY_DOWN,
            Key::Up => KEY_UP,
            Key::Left => KEY_LEFT,
        }
    }

    /// Parse a single-bit value
    pub fn from_bit(bit: u8) -> Option<Self> {
        Key::ALL.into_iter().find(|key| key.bit() == bit)
    }
}

/// Pressed state of all eight keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyState(u8);

impl KeyState {
    /// All four direction keys held at once.
    ///
    /// The device switches to its multi-track scope view on this chord and
    /// stops streaming display data while in it.
    pub const DIRECTION_CHORD: u8 = KEY_UP | KEY_DOWN | KEY_LEFT | KEY_RIGHT;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_pressed(self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn set_pressed(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.0 |= key.bit();
        } else {
            self.0 &= !key.bit();
        }
    }

    /// Returns true if exactly the four direction keys are held
    pub fn is_direction_chord(self) -> bool {
        self.0 == Self::DIRECTION_CHORD
    }

    /// Keys whose state differs from `previous`, with their new state
    pub fn changes_since(self, previous: KeyState) -> impl Iterator<Item = (Key, bool)> {
        Key::ALL
            .into_iter()
            .filter(move |key| self.is_pressed(*key) != previous.is_pressed(*key))
            .map(move |key| (key, self.is_pressed(key)))
    }
}
