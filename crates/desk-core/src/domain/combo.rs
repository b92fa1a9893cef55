//! ComboStateMachine: turns raw key press/release events into desk gestures.
//!
//! # Why a state machine?
//!
//! Operating systems auto-repeat a held key: holding Alt+PageUp for a second
//! produces one press, a stream of repeated presses, and finally one release.
//! The desk must receive exactly one `up` and exactly one `stop` for that
//! gesture, so every hold binding carries an `active` flag:
//!
//! ```text
//!            press(trigger) with modifier held
//!   Idle ───────────────────────────────────────► Active   emits Start
//!    ▲                                              │
//!    │             release(trigger)                 │
//!    └──────────────────────────────────────────────┘      emits Stop
//!
//!   press(trigger) while Active → nothing (auto-repeat suppressed)
//! ```
//!
//! The modifier only matters on the press.  Releasing Alt before PageUp still
//! stops the desk on the PageUp release.
//!
//! # Key state
//!
//! [`KeyState`] tracks which keys are currently held.  A release for a key
//! that was never seen pressed is normal (the listener may have started
//! mid-hold) and is silently ignored.
//!
//! # Known gap
//!
//! Hold bindings are independent.  Pressing Alt+PageUp and Alt+PageDown
//! together activates both; the desk controller is expected to cope with
//! overlapping `up`/`down` requests.

use std::collections::HashSet;

use tracing::trace;

use crate::domain::bindings::Bindings;
use crate::keymap::Key;
use crate::protocol::command::DeskCommand;

/// A raw key edge fed into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// A gesture edge emitted by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboEvent {
    /// A hold binding became active.
    Start { combo: String, command: DeskCommand },
    /// A hold binding was released.
    Stop { combo: String, command: DeskCommand },
    /// A one-shot binding fired.
    OneShot { combo: String, command: DeskCommand },
}

impl ComboEvent {
    /// The desk command to dispatch for this event.
    pub fn command(&self) -> DeskCommand {
        match self {
            ComboEvent::Start { command, .. }
            | ComboEvent::Stop { command, .. }
            | ComboEvent::OneShot { command, .. } => *command,
        }
    }

    /// The name of the binding that produced this event.
    pub fn combo(&self) -> &str {
        match self {
            ComboEvent::Start { combo, .. }
            | ComboEvent::Stop { combo, .. }
            | ComboEvent::OneShot { combo, .. } => combo,
        }
    }
}

/// The set of currently held keys.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Removes `key`.  Returns `false` if the key was not tracked.
    pub fn release(&mut self, key: Key) -> bool {
        self.held.remove(&key)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Returns `true` if at least one of `keys` is held.
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.held.contains(k))
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Edge-detecting state machine over a [`Bindings`] table.
///
/// Runs synchronously on the input thread; [`handle`](Self::handle) never
/// blocks and never performs I/O.
#[derive(Debug, Clone)]
pub struct ComboStateMachine {
    bindings: Bindings,
    keys: KeyState,
    /// One flag per entry in `bindings.hold`.
    active: Vec<bool>,
}

impl ComboStateMachine {
    pub fn new(bindings: Bindings) -> Self {
        let active = vec![false; bindings.hold.len()];
        Self {
            bindings,
            keys: KeyState::new(),
            active,
        }
    }

    /// Feeds one key edge and returns the gesture events it produced, in
    /// the order they must be dispatched.
    pub fn handle(&mut self, event: KeyEvent) -> Vec<ComboEvent> {
        match event {
            KeyEvent::Press(key) => self.on_press(key),
            KeyEvent::Release(key) => self.on_release(key),
        }
    }

    /// Returns whether the hold binding called `combo` is currently active.
    pub fn is_active(&self, combo: &str) -> bool {
        self.bindings
            .hold
            .iter()
            .zip(&self.active)
            .any(|(b, active)| *active && b.name == combo)
    }

    pub fn key_state(&self) -> &KeyState {
        &self.keys
    }

    fn on_press(&mut self, key: Key) -> Vec<ComboEvent> {
        self.keys.press(key);

        // The first hold binding whose modifier is held owns this press,
        // whether or not it was already active.
        let owner = self
            .bindings
            .hold
            .iter()
            .position(|b| b.trigger == key && self.keys.any_held(&b.modifiers));
        if let Some(index) = owner {
            if self.active[index] {
                trace!(combo = %self.bindings.hold[index].name, "repeat press suppressed");
                return Vec::new();
            }
            self.active[index] = true;
            let binding = &self.bindings.hold[index];
            return vec![ComboEvent::Start {
                combo: binding.name.clone(),
                command: binding.start,
            }];
        }

        self.bindings
            .one_shot
            .iter()
            .find(|b| b.trigger == key && self.keys.any_held(&b.modifiers))
            .map(|b| ComboEvent::OneShot {
                combo: b.name.clone(),
                command: b.command,
            })
            .into_iter()
            .collect()
    }

    fn on_release(&mut self, key: Key) -> Vec<ComboEvent> {
        if !self.keys.release(key) {
            trace!(%key, "release of untracked key");
        }

        let mut events = Vec::new();
        for (binding, active) in self.bindings.hold.iter().zip(self.active.iter_mut()) {
            if binding.trigger == key && *active {
                *active = false;
                events.push(ComboEvent::Stop {
                    combo: binding.name.clone(),
                    command: binding.stop,
                });
            }
        }
        events
    }
}

impl Default for ComboStateMachine {
    fn default() -> Self {
        Self::new(Bindings::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
