use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::input::EditorCommand;

/// Why [`ControlChannel::wait`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Command(EditorCommand),
    Shutdown,
    Timeout,
}

#[derive(Default)]
struct ControlState {
    commands: VecDeque<EditorCommand>,
    shutdown: bool,
}

/// Commands and the shutdown flag, with waits that either can interrupt.
///
/// Unlike `thread::sleep()`, a wait on this channel returns as soon as a
/// key is pressed or shutdown is triggered.
#[derive(Default)]
pub struct ControlChannel {
    state: Mutex<ControlState>,
    condvar: Condvar,
}

impl ControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a command for the main loop
    pub fn send(&self, command: EditorCommand) {
        self.lock().commands.push_back(command);
        self.condvar.notify_all();
    }

    /// Trigger shutdown, waking all waiting threads.
    pub fn trigger(&self) {
        self.lock().shutdown = true;
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    /// Wait up to `timeout` for a command or shutdown.
    ///
    /// Shutdown wins over queued commands.
    pub fn wait(&self, timeout: Duration) -> Wake {
        let guard = self.lock();
        let (mut state, _) = self
            .condvar
            .wait_timeout_while(guard, timeout, |s| !s.shutdown && s.commands.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        if state.shutdown {
            Wake::Shutdown
        } else if let Some(command) = state.commands.pop_front() {
            Wake::Command(command)
        } else {
            Wake::Timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_initial_state() {
        let control = ControlChannel::new();
        assert!(!control.is_shutdown());
    }

    #[test]
    fn test_wait_timeout() {
        let control = ControlChannel::new();
        let start = Instant::now();
        let wake = control.wait(Duration::from_millis(50));
        let elapsed = start.elapsed();

        assert_eq!(wake, Wake::Timeout);
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_queued_commands_in_order() {
        let control = ControlChannel::new();
        control.send(EditorCommand::ToggleFreeze);
        control.send(EditorCommand::Refresh);

        assert_eq!(
            control.wait(Duration::ZERO),
            Wake::Command(EditorCommand::ToggleFreeze)
        );
        assert_eq!(
            control.wait(Duration::ZERO),
            Wake::Command(EditorCommand::Refresh)
        );
        assert_eq!(control.wait(Duration::ZERO), Wake::Timeout);
    }

    #[test]
    fn test_wait_interrupted_by_command() {
        let control = Arc::new(ControlChannel::new());
        let waiter = Arc::clone(&control);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            (waiter.wait(Duration::from_secs(10)), start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        control.send(EditorCommand::ToggleAttach);

        let (wake, elapsed) = handle.join().unwrap();
        assert_eq!(wake, Wake::Command(EditorCommand::ToggleAttach));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_interrupted_by_shutdown() {
        let control = Arc::new(ControlChannel::new());
        let waiter = Arc::clone(&control);

        let handle = thread::spawn(move || waiter.wait(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(50));
        control.trigger();

        assert_eq!(handle.join().unwrap(), Wake::Shutdown);
    }

    #[test]
    fn test_shutdown_wins_over_commands() {
        let control = ControlChannel::new();
        control.send(EditorCommand::Refresh);
        control.trigger();

        assert!(control.is_shutdown());
        assert_eq!(control.wait(Duration::from_secs(10)), Wake::Shutdown);
    }
}
