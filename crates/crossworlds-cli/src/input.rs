use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::control::ControlChannel;

/// Actions the watch loop performs on a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    ToggleFreeze,
    Refresh,
    ToggleAutoRefresh,
    /// Detach when attached, attach otherwise
    ToggleAttach,
}

/// Spawn a thread that turns key presses into editor commands.
///
/// - `f` freeze, `r` refresh, `a` auto-refresh, `d` detach/attach
/// - Esc, `q`/`Q` or Ctrl+C trigger shutdown (Ctrl+C as backup to the ctrlc handler)
///
/// The thread never touches the editor; it only feeds `control`.
pub fn spawn_keyboard_monitor(control: Arc<ControlChannel>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !control.is_shutdown() {
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && key_event.kind == KeyEventKind::Press
            {
                if should_shutdown(&key_event) {
                    debug!("Shutdown key pressed: {:?}", key_event.code);
                    control.trigger();
                    break;
                }
                if let Some(command) = key_command(&key_event) {
                    debug!("Key {:?} -> {:?}", key_event.code, command);
                    control.send(command);
                }
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

/// Check if the key event should trigger shutdown.
fn should_shutdown(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}

fn key_command(event: &KeyEvent) -> Option<EditorCommand> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match event.code {
        KeyCode::Char('f') | KeyCode::Char('F') => Some(EditorCommand::ToggleFreeze),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(EditorCommand::Refresh),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(EditorCommand::ToggleAutoRefresh),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(EditorCommand::ToggleAttach),
        _ => None,
    }
}
