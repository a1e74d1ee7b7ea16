//! Pointer-chain resolution
//!
//! A chain such as `[game.exe+0x086CF928] -> +0xD8 -> +0x70 -> ... +0x58`
//! starts at a fixed module-relative root and follows pointers embedded in
//! heap objects until it reaches the value itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::memory::{ReadMemory, RemoteAddress};

/// A module-relative root plus the offsets applied after each dereference
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerChain {
    /// Offset from the module base to the first pointer (or to the value when
    /// `offsets` is empty)
    pub base_offset: u64,
    /// Offsets applied in order; every one but the last is followed by a dereference
    pub offsets: Vec<i64>,
}

impl PointerChain {
    pub fn new(base_offset: u64, offsets: impl Into<Vec<i64>>) -> Self {
        Self {
            base_offset,
            offsets: offsets.into(),
        }
    }

    /// A value stored directly at `module_base + base_offset`
    pub fn flat(base_offset: u64) -> Self {
        Self {
            base_offset,
            offsets: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Number of pointer reads needed to resolve this chain
    pub fn dereference_count(&self) -> usize {
        self.offsets.len()
    }
}

impl fmt::Display for PointerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[base+0x{:X}]", self.base_offset)?;
        for offset in &self.offsets {
            if *offset >= 0 {
                write!(f, "+0x{:X}", offset)?;
            } else {
                write!(f, "-0x{:X}", offset.unsigned_abs())?;
            }
        }
        Ok(())
    }
}

/// Walk `chain` from `module_base` and return the address of the value.
///
/// With no offsets the root address itself is returned and nothing is read.
/// Otherwise the root is dereferenced, then every offset but the last is
/// added and dereferenced in turn; the last offset is only added. The first
/// failed read, overflow or null link aborts the walk.
pub fn resolve<R: ReadMemory + ?Sized>(
    reader: &R,
    module_base: RemoteAddress,
    chain: &PointerChain,
) -> Result<RemoteAddress> {
    let root = module_base
        .checked_add(chain.base_offset)
        .ok_or(Error::AddressOverflow {
            base: module_base,
            offset: chain.base_offset as i64,
        })?;

    let Some((last, links)) = chain.offsets.split_last() else {
        return Ok(root);
    };

    let mut address = follow(reader, root, 0)?;
    for (index, offset) in links.iter().enumerate() {
        let field = offset_by(address, *offset)?;
        address = follow(reader, field, index + 1)?;
    }

    let target = offset_by(address, *last)?;
    trace!("Resolved {} -> {}", chain, target);
    Ok(target)
}

fn follow<R: ReadMemory + ?Sized>(
    reader: &R,
    address: RemoteAddress,
    link: usize,
) -> Result<RemoteAddress> {
    let next = reader.read_pointer(address)?;
    if next.is_null() {
        return Err(Error::NullPointer(link));
    }
    Ok(next)
}

fn offset_by(address: RemoteAddress, offset: i64) -> Result<RemoteAddress> {
    address
        .checked_offset(offset)
        .ok_or(Error::AddressOverflow {
            base: address,
            offset,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockProcess, PointerWidth};

    const BASE: u64 = 0x1_4000_0000;

    #[test]
    fn test_flat_chain_reads_nothing() {
        let process = MockProcess::builder().build();
        let memory = process.memory();
        let chain = PointerChain::flat(0x1234);

        let addr = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap();

        assert_eq!(addr, RemoteAddress::new(BASE + 0x1234));
        assert_eq!(process.read_count(), 0);
    }

    #[test]
    fn test_single_offset_one_dereference() {
        let process = MockProcess::builder()
            .pointer(BASE + 0x100, 0x2000_0000)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x100, [0x58]);

        let addr = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap();

        assert_eq!(addr, RemoteAddress::new(0x2000_0058));
        assert_eq!(process.read_count(), 1);
    }

    #[test]
    fn test_multi_level_chain_eight_byte() {
        let process = MockProcess::builder()
            .pointer_width(PointerWidth::Eight)
            .pointer(BASE + 0x086C_F928, 0x2_0000_1000)
            .pointer(0x2_0000_1000 + 0xD8, 0x2_0000_2000)
            .pointer(0x2_0000_2000 + 0x70, 0x2_0000_3000)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x086C_F928, [0xD8, 0x70, 0x58]);

        let addr = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap();

        assert_eq!(addr, RemoteAddress::new(0x2_0000_3058));
        assert_eq!(process.read_count(), 3);
    }

    #[test]
    fn test_multi_level_chain_four_byte() {
        let process = MockProcess::builder()
            .pointer_width(PointerWidth::Four)
            .pointer(0x40_0000 + 0x10, 0x0080_0000)
            .pointer(0x0080_0000 + 0x8, 0x0090_0000)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x10, [0x8, 0x24]);

        let addr = resolve(&memory, RemoteAddress::new(0x40_0000), &chain).unwrap();

        assert_eq!(addr, RemoteAddress::new(0x0090_0024));
        assert_eq!(process.read_count(), 2);
    }

    #[test]
    fn test_negative_offset() {
        let process = MockProcess::builder()
            .pointer(BASE + 0x10, 0x3000)
            .pointer(0x3000 - 0x8, 0x5000)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x10, [-0x8, -0x4]);

        let addr = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap();

        assert_eq!(addr, RemoteAddress::new(0x4FFC));
    }

    #[test]
    fn test_failed_read_short_circuits() {
        // Second link points at unmapped memory; the third is never attempted.
        let process = MockProcess::builder()
            .pointer(BASE + 0x100, 0x2000)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x100, [0x10, 0x20, 0x30]);

        let err = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap_err();

        assert!(matches!(err, Error::MemoryReadFailed { .. }));
        assert_eq!(process.read_count(), 2);
    }

    #[test]
    fn test_failed_root_read() {
        let process = MockProcess::builder().build();
        let memory = process.memory();
        let chain = PointerChain::new(0x100, [0x10]);

        assert!(resolve(&memory, RemoteAddress::new(BASE), &chain).is_err());
        assert_eq!(process.read_count(), 1);
    }

    #[test]
    fn test_null_link_aborts() {
        let process = MockProcess::builder()
            .pointer(BASE + 0x100, 0x2000)
            .pointer(0x2000 + 0x10, 0)
            .build();
        let memory = process.memory();
        let chain = PointerChain::new(0x100, [0x10, 0x20, 0x30]);

        let err = resolve(&memory, RemoteAddress::new(BASE), &chain).unwrap_err();

        assert!(matches!(err, Error::NullPointer(1)));
        assert_eq!(process.read_count(), 2);
    }

    #[test]
    fn test_chain_display() {
        let chain = PointerChain::new(0x086C_F928, [0xD8, -0x10]);
        assert_eq!(chain.to_string(), "[base+0x86CF928]+0xD8-0x10");
    }
}
