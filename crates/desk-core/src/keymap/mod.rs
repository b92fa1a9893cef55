//! Key identifiers shared by the input-capture adapters and the combo state machine.
//!
//! Only the keys that can take part in a desk shortcut get a named variant.
//! Every other key is carried as [`Key::Other`] with the platform code it was
//! captured with, so the state machine can still track that it is held.
//!
//! Names are stable and case-insensitive when parsed, which lets the
//! configuration file refer to keys as `"PageUp"` or `"altleft"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a key name is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown key name: {0:?}")]
pub struct KeyParseError(pub String);

/// A keyboard key as seen by the combo state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    AltLeft,
    AltRight,
    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    /// Left "super" key: Windows key, Command on macOS.
    MetaLeft,
    MetaRight,
    /// Any other key, identified by its platform code (0 when the platform
    /// reports a named key that has no variant here).
    Other(u32),
}

/// Name table used by both [`fmt::Display`] and [`FromStr`].
const KEY_NAMES: &[(Key, &str)] = &[
    (Key::PageUp, "PageUp"),
    (Key::PageDown, "PageDown"),
    (Key::Home, "Home"),
    (Key::End, "End"),
    (Key::Insert, "Insert"),
    (Key::Delete, "Delete"),
    (Key::ArrowUp, "ArrowUp"),
    (Key::ArrowDown, "ArrowDown"),
    (Key::ArrowLeft, "ArrowLeft"),
    (Key::ArrowRight, "ArrowRight"),
    (Key::AltLeft, "AltLeft"),
    (Key::AltRight, "AltRight"),
    (Key::ControlLeft, "ControlLeft"),
    (Key::ControlRight, "ControlRight"),
    (Key::ShiftLeft, "ShiftLeft"),
    (Key::ShiftRight, "ShiftRight"),
    (Key::MetaLeft, "MetaLeft"),
    (Key::MetaRight, "MetaRight"),
];

impl Key {
    /// Both Alt keys.
    pub const ALT: [Key; 2] = [Key::AltLeft, Key::AltRight];
    /// Both super/command keys.
    pub const META: [Key; 2] = [Key::MetaLeft, Key::MetaRight];

    /// Returns `true` for Alt, Control, Shift, and Meta on either side.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::AltLeft
                | Key::AltRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::ShiftLeft
                | Key::ShiftRight
                | Key::MetaLeft
                | Key::MetaRight
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Key::Other(code) = self {
            return write!(f, "Other({code})");
        }
        let name = KEY_NAMES
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, n)| *n)
            .unwrap_or("Unknown");
        f.write_str(name)
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        KEY_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
            .map(|(k, _)| *k)
            .ok_or_else(|| KeyParseError(s.to_string()))
    }
}

impl TryFrom<String> for Key {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
