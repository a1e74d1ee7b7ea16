//! Set command implementation.

use anyhow::{Result, bail};
use crossworlds_core::EditorConfig;

use super::attached_editor;

/// Write `value` to the tracked value called `name` and read it back
pub fn run(config: EditorConfig, name: &str, value: i32) -> Result<()> {
    let mut editor = attached_editor(config)?;

    let Some(index) = editor.find_value(name) else {
        let known: Vec<&str> = editor.values().iter().map(|v| v.name.as_str()).collect();
        bail!("Unknown value {:?} (known: {})", name, known.join(", "));
    };

    let before = editor.values()[index].current;
    editor.set_pending(index, value);
    if !editor.apply(index) {
        bail!("{}", editor.status());
    }
    println!("{}", editor.status());

    editor.refresh();
    let after = editor.values()[index].current;
    println!("{}: {} -> {}", editor.values()[index].name, before, after);

    editor.shutdown();
    Ok(())
}
