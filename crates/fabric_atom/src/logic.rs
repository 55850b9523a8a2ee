//! Four-state logic values for gate-level truth tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single logic value in a truth-table cover row.
///
/// The four states represent:
/// - `False` — logic low (0)
/// - `True` — logic high (1)
/// - `DontCare` — the row matches either value at this position
/// - `Unknown` — unspecified (used for latch initial states)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    False = 0,
    /// Logic high (1).
    True = 1,
    /// Matches either value.
    DontCare = 2,
    /// Unspecified value.
    Unknown = 3,
}

impl Logic {
    /// Converts a truth-table character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', and '-'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::False),
            '1' => Some(Logic::True),
            '-' => Some(Logic::DontCare),
            _ => None,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::False => write!(f, "0"),
            Logic::True => write!(f, "1"),
            Logic::DontCare => write!(f, "-"),
            Logic::Unknown => write!(f, "x"),
        }
    }
}
