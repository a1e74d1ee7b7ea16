//! Interactive watch mode.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossworlds_core::{
    EditorConfig, MemoryEditor, ProcessProvider, SystemProcesses, TickOutcome, ValueSnapshot,
};
use tracing::{debug, info};

use crate::control::{ControlChannel, Wake};
use crate::input::{self, EditorCommand};

/// Run the interactive editor until Esc, q or Ctrl+C
pub fn run(config: EditorConfig) -> Result<()> {
    let control = Arc::new(ControlChannel::new());
    let control_ctrlc = Arc::clone(&control);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        control_ctrlc.trigger();
    })?;

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&control));

    let idle_wait = config.refresh_interval();
    let mut editor = MemoryEditor::new(SystemProcesses::default(), config);

    println!(
        "Searching for {}... (f: freeze, r: refresh, a: auto-refresh, d: detach/attach, q: quit)",
        editor.config().process_name
    );
    editor.start(Instant::now());

    let mut last_line = String::new();
    report(&editor, &mut last_line);

    loop {
        let timeout = editor
            .next_wakeup()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(idle_wait);

        match control.wait(timeout) {
            Wake::Shutdown => break,
            Wake::Command(command) => handle_command(&mut editor, command, Instant::now()),
            Wake::Timeout => {}
        }

        match editor.tick(Instant::now()) {
            TickOutcome::Idle => {}
            outcome => debug!("Tick: {:?}", outcome),
        }
        report(&editor, &mut last_line);
    }

    editor.shutdown();
    println!("{}", editor.status());
    Ok(())
}

fn handle_command<P: ProcessProvider>(
    editor: &mut MemoryEditor<P>,
    command: EditorCommand,
    now: Instant,
) {
    match command {
        EditorCommand::ToggleFreeze => {
            editor.toggle_freeze();
        }
        EditorCommand::Refresh => {
            editor.refresh();
        }
        EditorCommand::ToggleAutoRefresh => {
            let enabled = !editor.auto_refresh();
            editor.set_auto_refresh(enabled, now);
            println!(
                "Auto-refresh {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        EditorCommand::ToggleAttach => {
            if editor.can_detach() {
                editor.detach(now);
            } else {
                editor.attach(now);
            }
        }
    }
}

/// Print the status line when anything visible changed
fn report<P: ProcessProvider>(editor: &MemoryEditor<P>, last_line: &mut String) {
    let line = if editor.is_attached() {
        format!(
            "{} | {}",
            format_values(&editor.snapshots(), editor.is_frozen()),
            editor.status()
        )
    } else {
        editor.status().to_string()
    };

    if line != *last_line {
        println!("{}", line);
        *last_line = line;
    }
}

fn format_values(values: &[ValueSnapshot], frozen: bool) -> String {
    let mut parts: Vec<String> = values
        .iter()
        .map(|v| format!("{}: {}", v.name, v.current))
        .collect();
    if frozen {
        parts.push("[frozen]".to_string());
    }
    parts.join("  ")
}
