//! HandleHotkeysUseCase: turns captured key edges into desk commands.
//!
//! Runs on a plain OS thread.  Each [`RawKeyEvent`] is fed through the
//! [`ComboStateMachine`]; every resulting [`ComboEvent`] is handed to a
//! [`CommandSink`], which in production spawns a network task and returns
//! immediately.  Nothing here ever waits on the network, so a slow desk
//! cannot delay the processing of the next key event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use desk_core::{Bindings, ComboEvent, ComboStateMachine, DeskCommand, KeyEvent};
use tracing::{debug, info, trace};

use crate::application::send_command::Dispatcher;
use crate::infrastructure::input_capture::RawKeyEvent;

/// How often the loop wakes up to check the running flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Receiver of commands produced by the state machine.
///
/// Must not block: it is called from the input thread.
pub trait CommandSink: Send + Sync {
    fn submit(&self, command: DeskCommand);
}

impl CommandSink for Arc<Dispatcher> {
    fn submit(&self, command: DeskCommand) {
        // Fire-and-forget; the task logs its own outcome.
        drop(self.dispatch(command));
    }
}

/// Use case that owns the combo state machine.
pub struct HandleHotkeysUseCase<S: CommandSink> {
    machine: ComboStateMachine,
    sink: S,
}

impl<S: CommandSink> HandleHotkeysUseCase<S> {
    pub fn new(bindings: Bindings, sink: S) -> Self {
        Self {
            machine: ComboStateMachine::new(bindings),
            sink,
        }
    }

    pub fn machine(&self) -> &ComboStateMachine {
        &self.machine
    }

    /// Processes one raw event and submits the resulting commands.
    ///
    /// Returns the emitted combo events, mainly for tests.
    pub fn handle_event(&mut self, event: RawKeyEvent) -> Vec<ComboEvent> {
        let key_event = match event {
            RawKeyEvent::KeyDown { key } => KeyEvent::Press(key),
            RawKeyEvent::KeyUp { key } => KeyEvent::Release(key),
        };
        trace!(?key_event, "key edge");

        let emitted = self.machine.handle(key_event);
        for event in &emitted {
            match event {
                ComboEvent::Start { combo, command } => {
                    info!(combo = %combo, %command, "combo pressed")
                }
                ComboEvent::Stop { combo, command } => {
                    info!(combo = %combo, %command, "combo released")
                }
                ComboEvent::OneShot { combo, command } => {
                    info!(combo = %combo, %command, "preset selected")
                }
            }
            self.sink.submit(event.command());
        }
        emitted
    }

    /// Consumes `events` until the channel closes or `running` is cleared.
    pub fn run(&mut self, events: &Receiver<RawKeyEvent>, running: &AtomicBool) {
        info!("hotkey loop started");
        while running.load(Ordering::Relaxed) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input channel closed");
                    break;
                }
            }
        }
        info!("hotkey loop stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::Key;
    use std::sync::mpsc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        commands: Mutex<Vec<DeskCommand>>,
    }

    impl CommandSink for Arc<RecordingSink> {
        fn submit(&self, command: DeskCommand) {
            self.commands.lock().unwrap().push(command);
        }
    }

    fn use_case() -> (HandleHotkeysUseCase<Arc<RecordingSink>>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (HandleHotkeysUseCase::new(Bindings::default(), Arc::clone(&sink)), sink)
    }

    fn down(key: Key) -> RawKeyEvent {
        RawKeyEvent::KeyDown { key }
    }

    fn up(key: Key) -> RawKeyEvent {
        RawKeyEvent::KeyUp { key }
    }

    #[test]
    fn test_alt_page_up_hold_submits_up_then_stop() {
        // Arrange
        let (mut uc, sink) = use_case();

        // Act – auto-repeat delivers several presses while held
        for event in [
            down(Key::AltLeft),
            down(Key::PageUp),
            down(Key::PageUp),
            down(Key::PageUp),
            up(Key::PageUp),
            up(Key::AltLeft),
        ] {
            uc.handle_event(event);
        }

        // Assert
        assert_eq!(
            *sink.commands.lock().unwrap(),
            vec![DeskCommand::Up, DeskCommand::Stop]
        );
    }

    #[test]
    fn test_super_page_down_submits_seating_only() {
        let (mut uc, sink) = use_case();

        for event in [
            down(Key::MetaLeft),
            down(Key::PageDown),
            up(Key::PageDown),
            up(Key::MetaLeft),
        ] {
            uc.handle_event(event);
        }

        assert_eq!(*sink.commands.lock().unwrap(), vec![DeskCommand::Seating]);
    }

    #[test]
    fn test_hold_combo_stays_active_until_trigger_released() {
        let (mut uc, _sink) = use_case();

        uc.handle_event(down(Key::AltRight));
        uc.handle_event(down(Key::PageDown));
        assert!(uc.machine().is_active("lower"));

        uc.handle_event(up(Key::AltRight));
        assert!(uc.machine().is_active("lower"));

        uc.handle_event(up(Key::PageDown));
        assert!(!uc.machine().is_active("lower"));
    }

    #[test]
    fn test_page_up_without_modifier_submits_nothing() {
        let (mut uc, sink) = use_case();

        uc.handle_event(down(Key::PageUp));
        uc.handle_event(up(Key::PageUp));

        assert!(sink.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_drains_channel_until_disconnected() {
        // Arrange
        let (mut uc, sink) = use_case();
        let (tx, rx) = mpsc::channel();
        for event in [down(Key::AltRight), down(Key::PageDown), up(Key::PageDown)] {
            tx.send(event).unwrap();
        }
        drop(tx);
        let running = AtomicBool::new(true);

        // Act
        uc.run(&rx, &running);

        // Assert
        assert_eq!(
            *sink.commands.lock().unwrap(),
            vec![DeskCommand::Down, DeskCommand::Stop]
        );
    }

    #[test]
    fn test_run_returns_when_running_flag_cleared() {
        let (mut uc, sink) = use_case();
        let (_tx, rx) = mpsc::channel::<RawKeyEvent>();
        let running = AtomicBool::new(false);

        uc.run(&rx, &running);

        assert!(sink.commands.lock().unwrap().is_empty());
    }
}
