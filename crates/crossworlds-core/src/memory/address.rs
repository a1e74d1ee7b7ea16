//! Addresses in the target process's address space.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An address inside the target process.
///
/// Kept apart from host pointers on purpose: it is only ever handed to the
/// OS read/write calls, never dereferenced locally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RemoteAddress(u64);

impl RemoteAddress {
    pub const NULL: RemoteAddress = RemoteAddress(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Add a signed offset. Returns `None` when the result leaves the 64-bit range.
    pub fn checked_offset(self, offset: i64) -> Option<Self> {
        self.0.checked_add_signed(offset).map(Self)
    }

    /// Add an unsigned offset, such as a module-relative one.
    pub fn checked_add(self, offset: u64) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl fmt::UpperHex for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl From<u64> for RemoteAddress {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Size of a pointer stored in the target's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Four,
    Eight,
}

impl PointerWidth {
    /// Pointer width of the running host
    pub const fn host() -> Self {
        if std::mem::size_of::<usize>() == 8 {
            PointerWidth::Eight
        } else {
            PointerWidth::Four
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            PointerWidth::Four => 4,
            PointerWidth::Eight => 8,
        }
    }

    /// Decode a little-endian pointer. `bytes` must be exactly `self.bytes()` long.
    pub fn decode(self, bytes: &[u8]) -> Option<RemoteAddress> {
        match self {
            PointerWidth::Four => {
                let raw: [u8; 4] = bytes.try_into().ok()?;
                Some(RemoteAddress(u64::from(u32::from_le_bytes(raw))))
            }
            PointerWidth::Eight => {
                let raw: [u8; 8] = bytes.try_into().ok()?;
                Some(RemoteAddress(u64::from_le_bytes(raw)))
            }
        }
    }
}

impl Default for PointerWidth {
    fn default() -> Self {
        Self::host()
    }
}
