//! Status command implementation.

use anyhow::Result;
use crossworlds_core::{AttachmentManager, EditorConfig, FreezePatch, SystemProcesses};
use tracing::debug;

/// State of the freeze patch site as seen in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    Frozen,
    Original,
    /// Neither byte sequence; the game build may not match
    Unknown,
}

impl PatchState {
    pub fn classify(patch: &FreezePatch, bytes: &[u8]) -> Self {
        if bytes == patch.patched_bytes() {
            PatchState::Frozen
        } else if bytes == patch.original_bytes() {
            PatchState::Original
        } else {
            PatchState::Unknown
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PatchState::Frozen => "frozen (no-op patch present)",
            PatchState::Original => "not frozen (original instruction)",
            PatchState::Unknown => "unrecognized bytes (game version mismatch?)",
        }
    }
}

/// Run the status command
pub fn run(config: &EditorConfig) -> Result<()> {
    let mut manager =
        AttachmentManager::new(SystemProcesses::default(), config.process_name.as_str());

    println!("Process: {}", manager.process_name());
    println!("Status:  {}", manager.process_status());

    if let Err(e) = manager.attach() {
        debug!("Attach failed: {}", e);
        return Ok(());
    }

    if let Some(attachment) = manager.attachment() {
        println!("PID:     {}", attachment.pid);
        println!("Base:    {}", attachment.module_base);
        println!("Pointer: {} bytes", attachment.pointer_width.bytes());
    }

    let patch = FreezePatch::tickets();
    let address = manager.module_address(patch.target_offset())?;
    match manager.read_bytes(address, patch.patched_bytes().len()) {
        Ok(bytes) => println!(
            "Freeze:  {}",
            PatchState::classify(&patch, &bytes).describe()
        ),
        Err(e) => println!("Freeze:  unreadable ({})", e),
    }

    manager.detach();
    Ok(())
}
