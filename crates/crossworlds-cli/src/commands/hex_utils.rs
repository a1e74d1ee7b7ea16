//! Hex address and offset parsing.

use anyhow::Result;

/// Parse a hex address string (with or without 0x prefix).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_hex_address("0x86CF928").unwrap(), 0x86CF928);
/// assert_eq!(parse_hex_address("86CF928").unwrap(), 0x86CF928);
/// ```
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim();
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16)
        .map_err(|e| anyhow::anyhow!("Invalid hex address {:?}: {}", s, e))
}

/// Parse a signed hex offset such as `0xD8`, `-0x10` or `+58`
pub fn parse_hex_offset(s: &str) -> Result<i64> {
    let s = s.trim();
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let value = parse_hex_address(magnitude)?;
    let value =
        i64::try_from(value).map_err(|_| anyhow::anyhow!("Offset out of range: {}", s))?;
    Ok(if negative { -value } else { value })
}

/// Parse a list of offsets, skipping empty entries
pub fn parse_offsets<S: AsRef<str>>(items: &[S]) -> Result<Vec<i64>> {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.trim().is_empty())
        .map(parse_hex_offset)
        .collect()
}
