//! Key binding tables that drive the [`ComboStateMachine`](super::combo::ComboStateMachine).
//!
//! There are two kinds of binding:
//!
//! - **Hold** bindings start a movement when the trigger is pressed with a
//!   modifier held, and stop it when the trigger is released.
//! - **One-shot** bindings fire a single command on press and have no
//!   matching stop.
//!
//! The defaults reproduce the classic layout:
//!
//! | Shortcut            | Kind     | Commands        |
//! |---------------------|----------|-----------------|
//! | Alt + PageUp        | hold     | `up` / `stop`   |
//! | Alt + PageDown      | hold     | `down` / `stop` |
//! | Super + PageUp      | one-shot | `standing`      |
//! | Super + PageDown    | one-shot | `seating`       |
//!
//! Bindings can be overridden in the `[bindings]` section of the config file:
//!
//! ```toml
//! [[bindings.hold]]
//! name = "lift"
//! modifiers = ["ControlLeft"]
//! trigger = "ArrowUp"
//! start = "up"
//! stop = "stop"
//! ```
//!
//! Each list is replaced as a whole when present and keeps its defaults when
//! absent.  `one_shot = []` disables the presets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::Key;
use crate::protocol::command::DeskCommand;

/// Error returned by [`Bindings::validate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("binding {name:?} has no modifier keys")]
    NoModifiers { name: String },
    #[error("binding {name:?} uses modifier key {key} as its trigger")]
    TriggerIsModifier { name: String, key: Key },
    #[error("hold bindings {first:?} and {second:?} share trigger {trigger} and a modifier")]
    Conflict {
        first: String,
        second: String,
        trigger: Key,
    },
    #[error("hold binding name {name:?} is used more than once")]
    DuplicateName { name: String },
    #[error("one-shot binding {name:?} is always taken by a hold binding on trigger {trigger}")]
    Shadowed { name: String, trigger: Key },
}

/// A press-and-hold combo with a start and a stop command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldBinding {
    /// Name used in logs (e.g. `"lift"`).
    pub name: String,
    /// Any one of these keys must be held when the trigger is pressed.
    pub modifiers: Vec<Key>,
    pub trigger: Key,
    pub start: DeskCommand,
    pub stop: DeskCommand,
}

/// A fire-once combo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotBinding {
    pub name: String,
    /// Any one of these keys must be held when the trigger is pressed.
    pub modifiers: Vec<Key>,
    pub trigger: Key,
    pub command: DeskCommand,
}

/// The complete set of bindings.
///
/// When a trigger press matches both a hold binding and a one-shot binding,
/// the hold binding wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(default = "default_hold")]
    pub hold: Vec<HoldBinding>,
    #[serde(default = "default_one_shot")]
    pub one_shot: Vec<OneShotBinding>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            hold: default_hold(),
            one_shot: default_one_shot(),
        }
    }
}

fn default_hold() -> Vec<HoldBinding> {
    vec![
        HoldBinding {
            name: "lift".to_string(),
            modifiers: Key::ALT.to_vec(),
            trigger: Key::PageUp,
            start: DeskCommand::Up,
            stop: DeskCommand::Stop,
        },
        HoldBinding {
            name: "lower".to_string(),
            modifiers: Key::ALT.to_vec(),
            trigger: Key::PageDown,
            start: DeskCommand::Down,
            stop: DeskCommand::Stop,
        },
    ]
}

fn default_one_shot() -> Vec<OneShotBinding> {
    vec![
        OneShotBinding {
            name: "standing".to_string(),
            modifiers: Key::META.to_vec(),
            trigger: Key::PageUp,
            command: DeskCommand::Standing,
        },
        OneShotBinding {
            name: "seating".to_string(),
            modifiers: Key::META.to_vec(),
            trigger: Key::PageDown,
            command: DeskCommand::Seating,
        },
    ]
}

impl Bindings {
    /// Checks the table for bindings that could never fire or that would
    /// fight over the same gesture.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`] found.
    pub fn validate(&self) -> Result<(), BindingError> {
        let all = self
            .hold
            .iter()
            .map(|b| (&b.name, &b.modifiers, b.trigger))
            .chain(self.one_shot.iter().map(|b| (&b.name, &b.modifiers, b.trigger)));

        for (name, modifiers, trigger) in all {
            if modifiers.is_empty() {
                return Err(BindingError::NoModifiers { name: name.clone() });
            }
            if trigger.is_modifier() {
                return Err(BindingError::TriggerIsModifier {
                    name: name.clone(),
                    key: trigger,
                });
            }
        }

        for (i, first) in self.hold.iter().enumerate() {
            for second in &self.hold[i + 1..] {
                if first.name == second.name {
                    return Err(BindingError::DuplicateName {
                        name: first.name.clone(),
                    });
                }
                let shares_modifier = first.modifiers.iter().any(|m| second.modifiers.contains(m));
                if first.trigger == second.trigger && shares_modifier {
                    return Err(BindingError::Conflict {
                        first: first.name.clone(),
                        second: second.name.clone(),
                        trigger: first.trigger,
                    });
                }
            }
        }

        // A hold binding owns any press of its trigger while one of its
        // modifiers is down.
        for one_shot in &self.one_shot {
            let covered = one_shot.modifiers.iter().all(|m| {
                self.hold
                    .iter()
                    .any(|h| h.trigger == one_shot.trigger && h.modifiers.contains(m))
            });
            if covered {
                return Err(BindingError::Shadowed {
                    name: one_shot.name.clone(),
                    trigger: one_shot.trigger,
                });
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
