//! Global keyboard listener backed by `rdev`.
//!
//! `rdev::listen` blocks its thread for the lifetime of the process and
//! cannot be cancelled, so [`GlobalKeyboardSource::stop`] only flips a flag.
//! The callback drops its sender on the next event it sees after that,
//! which closes the channel for the consumer.
//!
//! On Linux this requires an X11 session; under Wayland the listener fails
//! to start and the failure is logged.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use desk_core::Key;
use tracing::{error, info};

use super::{CaptureError, InputSource, RawKeyEvent};

/// Translates an `rdev` key into the shared [`Key`] type.
pub fn map_key(key: rdev::Key) -> Key {
    match key {
        rdev::Key::PageUp => Key::PageUp,
        rdev::Key::PageDown => Key::PageDown,
        rdev::Key::Home => Key::Home,
        rdev::Key::End => Key::End,
        rdev::Key::Insert => Key::Insert,
        rdev::Key::Delete => Key::Delete,
        rdev::Key::UpArrow => Key::ArrowUp,
        rdev::Key::DownArrow => Key::ArrowDown,
        rdev::Key::LeftArrow => Key::ArrowLeft,
        rdev::Key::RightArrow => Key::ArrowRight,
        rdev::Key::Alt => Key::AltLeft,
        rdev::Key::AltGr => Key::AltRight,
        rdev::Key::ControlLeft => Key::ControlLeft,
        rdev::Key::ControlRight => Key::ControlRight,
        rdev::Key::ShiftLeft => Key::ShiftLeft,
        rdev::Key::ShiftRight => Key::ShiftRight,
        rdev::Key::MetaLeft => Key::MetaLeft,
        rdev::Key::MetaRight => Key::MetaRight,
        rdev::Key::Unknown(code) => Key::Other(code),
        named => Key::Other(named_key_code(named)),
    }
}

/// High bit marks codes derived from named `rdev` keys, keeping them apart
/// from raw platform codes reported through `Unknown`.
const NAMED_KEY_TAG: u32 = 0x8000_0000;

/// Stable per-process code for an `rdev` key with no [`Key`] variant.
fn named_key_code(key: rdev::Key) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    NAMED_KEY_TAG | (hasher.finish() as u32 & !NAMED_KEY_TAG)
}

/// Translates an `rdev` event; non-keyboard events yield `None`.
pub fn map_event(event: &rdev::EventType) -> Option<RawKeyEvent> {
    match *event {
        rdev::EventType::KeyPress(key) => Some(RawKeyEvent::KeyDown { key: map_key(key) }),
        rdev::EventType::KeyRelease(key) => Some(RawKeyEvent::KeyUp { key: map_key(key) }),
        _ => None,
    }
}

/// [`InputSource`] that observes every key event on the desktop session.
#[derive(Default)]
pub struct GlobalKeyboardSource {
    started: AtomicBool,
    stopped: Arc<AtomicBool>,
}

impl GlobalKeyboardSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for GlobalKeyboardSource {
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::channel();
        let stopped = Arc::clone(&self.stopped);

        thread::Builder::new()
            .name("keyboard-listener".to_string())
            .spawn(move || {
                let mut sender = Some(tx);
                let callback = move |event: rdev::Event| {
                    if stopped.load(Ordering::Relaxed) {
                        sender = None;
                        return;
                    }
                    let (Some(tx), Some(raw)) = (sender.as_ref(), map_event(&event.event_type))
                    else {
                        return;
                    };
                    if tx.send(raw).is_err() {
                        sender = None;
                    }
                };
                info!("keyboard listener started");
                if let Err(e) = rdev::listen(callback) {
                    error!("keyboard listener failed: {e:?}");
                }
            })
            .map_err(|e| CaptureError::ListenerFailed(e.to_string()))?;

        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
