//! Mock input source for unit and integration tests.
//!
//! Lets tests inject synthetic [`RawKeyEvent`]s without a keyboard hook.

use std::sync::{
    mpsc::{self, Sender},
    Mutex,
};

use desk_core::Key;

use super::{CaptureError, InputSource, RawKeyEvent};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
#[derive(Default)]
pub struct MockInputSource {
    sender: Mutex<Option<Sender<RawKeyEvent>>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from the keyboard.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_event(&self, event: RawKeyEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender
                .send(event)
                .expect("receiver has been dropped; call start() first"),
            None => panic!("MockInputSource::inject_event called before start()"),
        }
    }

    /// Injects a full press-and-release of `keys`: presses in order, then
    /// releases in reverse order.
    pub fn tap_chord(&self, keys: &[Key]) {
        for &key in keys {
            self.inject_event(RawKeyEvent::KeyDown { key });
        }
        for &key in keys.iter().rev() {
            self.inject_event(RawKeyEvent::KeyUp { key });
        }
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}
