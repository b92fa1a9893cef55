//! The desk controller's command vocabulary.
//!
//! The controller exposes one HTTP endpoint per command; the command name is
//! the final path segment of the request (`GET http://<desk>/up`).
//!
//! | Command    | Effect                                   |
//! |------------|------------------------------------------|
//! | `up`       | Start raising; runs until `stop`         |
//! | `down`     | Start lowering; runs until `stop`        |
//! | `stop`     | Halt any movement                        |
//! | `standing` | Move to the stored standing preset       |
//! | `seating`  | Move to the stored seating preset        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a command name is not part of the vocabulary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown desk command: {0:?}")]
pub struct CommandParseError(pub String);

/// A single command understood by the desk controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeskCommand {
    Up,
    Down,
    Stop,
    Standing,
    Seating,
}

impl DeskCommand {
    /// Every command, in vocabulary order.
    pub const ALL: [DeskCommand; 5] = [
        DeskCommand::Up,
        DeskCommand::Down,
        DeskCommand::Stop,
        DeskCommand::Standing,
        DeskCommand::Seating,
    ];

    /// The URL path segment for this command.
    pub fn as_path(self) -> &'static str {
        match self {
            DeskCommand::Up => "up",
            DeskCommand::Down => "down",
            DeskCommand::Stop => "stop",
            DeskCommand::Standing => "standing",
            DeskCommand::Seating => "seating",
        }
    }
}

impl fmt::Display for DeskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for DeskCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeskCommand::ALL
            .into_iter()
            .find(|c| c.as_path().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CommandParseError(s.to_string()))
    }
}
