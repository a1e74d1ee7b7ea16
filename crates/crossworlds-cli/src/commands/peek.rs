//! Peek command implementation.
//!
//! Resolves an arbitrary pointer chain against the game module and reads the
//! value at its end, for checking offsets after a game update.

use anyhow::Result;
use crossworlds_core::{EditorConfig, PointerChain};

use super::attached_manager;
use super::hex_utils::{parse_hex_address, parse_offsets};

/// Run the peek command
pub fn run(config: &EditorConfig, base: &str, offsets: &[String], float: bool) -> Result<()> {
    let chain = PointerChain::new(parse_hex_address(base)?, parse_offsets(offsets)?);
    let manager = attached_manager(config)?;

    println!("Chain:   {}", chain);
    let address = manager.resolve(&chain)?;
    println!("Address: {}", address);

    if float {
        println!("Value:   {}", manager.try_read_f32(&chain)?);
    } else {
        let value = manager.try_read_i32(&chain)?;
        println!("Value:   {} (0x{:08X})", value, value);
    }
    Ok(())
}
