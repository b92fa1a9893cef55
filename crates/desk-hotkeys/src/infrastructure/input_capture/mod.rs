//! Input capture infrastructure.
//!
//! A global keyboard listener runs on a dedicated OS thread and pushes key
//! edges into a `std::sync::mpsc` channel.  The listener callback does no
//! work beyond translating the platform key code; combo detection happens on
//! the consumer side in `HandleHotkeysUseCase`.
//!
//! Events are observed, never suppressed: other applications still receive
//! Alt+PgUp and friends.
//!
//! # Testability
//!
//! The [`InputSource`] trait lets tests inject synthetic events through
//! [`mock::MockInputSource`] without installing an OS hook.

use std::sync::mpsc;

use desk_core::Key;

pub mod global_hook;
pub mod mock;

/// A key edge produced by the input capture infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKeyEvent {
    /// A key was pressed down (or auto-repeated).
    KeyDown { key: Key },
    /// A key was released.
    KeyUp { key: Key },
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to start keyboard listener: {0}")]
    ListenerFailed(String),
    #[error("input source already started")]
    AlreadyStarted,
}

/// Trait abstracting key event production.
///
/// The production implementation is [`global_hook::GlobalKeyboardSource`];
/// tests use [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts the source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError>;
    /// Stops delivering events.  The receiver observes a closed channel.
    fn stop(&self);
}
