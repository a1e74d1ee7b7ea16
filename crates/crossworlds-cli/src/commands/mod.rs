//! CLI command implementations.

pub mod hex_utils;
pub mod hexdump;
pub mod peek;
pub mod read;
pub mod set;
pub mod status;
pub mod watch;

use std::time::Instant;

use anyhow::{Result, bail};
use crossworlds_core::{AttachmentManager, EditorConfig, MemoryEditor, SystemProcesses};

/// Attach an editor session once, without starting the polling tasks
fn attached_editor(config: EditorConfig) -> Result<MemoryEditor<SystemProcesses>> {
    let mut editor = MemoryEditor::new(SystemProcesses::default(), config);
    if !editor.attach(Instant::now()) {
        bail!("{}", editor.status());
    }
    Ok(editor)
}

/// Attach a bare manager for diagnostic commands
fn attached_manager(config: &EditorConfig) -> Result<AttachmentManager<SystemProcesses>> {
    let mut manager =
        AttachmentManager::new(SystemProcesses::default(), config.process_name.as_str());
    manager.attach()?;
    Ok(manager)
}
