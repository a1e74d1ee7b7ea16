//! Hexdump command implementation.
//!
//! Displays raw bytes at a module-relative offset in traditional hexdump
//! format. Without an offset it dumps the freeze patch site.
//!
//! # Output Format
//!
//! ```text
//! 0x000: 89 5E 58                                          |.^X|
//! ```

use anyhow::Result;
use crossworlds_core::{EditorConfig, FreezePatch};

use super::attached_manager;
use super::hex_utils::parse_hex_address;
use super::status::PatchState;

/// Run the hexdump command
pub fn run(config: &EditorConfig, offset: Option<&str>, size: usize, ascii: bool) -> Result<()> {
    let patch = FreezePatch::tickets();
    let offset = match offset {
        Some(s) => parse_hex_address(s)?,
        None => patch.target_offset(),
    };

    let manager = attached_manager(config)?;
    let address = manager.module_address(offset)?;
    let bytes = manager.read_bytes(address, size)?;

    println!(
        "Hexdump at {} (base+0x{:X}, {} bytes):",
        address, offset, size
    );
    println!();
    for line in format_hexdump(&bytes, ascii) {
        println!("{}", line);
    }

    if offset == patch.target_offset() && size >= patch.patched_bytes().len() {
        let site = &bytes[..patch.patched_bytes().len()];
        println!();
        println!("Freeze patch: {}", PatchState::classify(&patch, site).describe());
    }

    Ok(())
}

/// Render `bytes` as 16-byte rows with an optional ASCII column
pub fn format_hexdump(bytes: &[u8], ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:03X}: ", i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                line.push_str(" |");
                for byte in chunk {
                    if (0x20..0x7F).contains(byte) {
                        line.push(*byte as char);
                    } else {
                        line.push('.');
                    }
                }
                line.push('|');
            }

            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_row() {
        let lines = format_hexdump(&[0x89, 0x5E, 0x58], false);
        assert_eq!(lines, vec!["0x000: 89 5E 58"]);
    }

    #[test]
    fn test_format_with_ascii() {
        let lines = format_hexdump(&[0x89, 0x5E, 0x58], true);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("0x000: 89 5E 58 "));
        assert!(lines[0].ends_with("|.^X|"));
    }

    #[test]
    fn test_format_multiple_rows() {
        let bytes: Vec<u8> = (0..20).collect();
        let lines = format_hexdump(&bytes, false);

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x000: 00 01 02 03 04 05 06 07  08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[1], "0x010: 10 11 12 13");
    }

    #[test]
    fn test_format_empty() {
        assert!(format_hexdump(&[], true).is_empty());
    }
}
