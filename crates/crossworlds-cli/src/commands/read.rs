//! Read command implementation.

use anyhow::Result;
use crossworlds_core::{EditorConfig, RefreshOutcome};
use tracing::{info, warn};

use super::attached_editor;

/// Attach, read every tracked value once and print it
pub fn run(config: EditorConfig, json: bool) -> Result<()> {
    let mut editor = attached_editor(config)?;

    match editor.refresh() {
        RefreshOutcome::UsedCache => warn!("{}", editor.status()),
        outcome => info!("Refresh: {:?}", outcome),
    }

    let snapshots = editor.snapshots();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        for value in &snapshots {
            println!("{:<10} {:>12}  ({})", value.name, value.current, value.description);
            println!("{:<10} {}", "", value.chain);
        }
    }

    editor.shutdown();
    Ok(())
}
