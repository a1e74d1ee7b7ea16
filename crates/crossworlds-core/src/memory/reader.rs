//! Typed access to remote memory on top of raw byte reads and writes.

use crate::error::{Error, Result};
use crate::memory::{PointerWidth, RemoteAddress};

/// Read access to a target process's memory.
///
/// Implementors provide `read_bytes`; the typed readers are built on it and
/// interpret values as little-endian.
pub trait ReadMemory {
    fn read_bytes(&self, address: RemoteAddress, size: usize) -> Result<Vec<u8>>;

    /// Width of pointers stored in the target's memory
    fn pointer_width(&self) -> PointerWidth {
        PointerWidth::host()
    }

    fn read_i32(&self, address: RemoteAddress) -> Result<i32> {
        let bytes = self.read_exact::<4>(address)?;
        Ok(i32::from_le_bytes(bytes))
    }

    fn read_f32(&self, address: RemoteAddress) -> Result<f32> {
        let bytes = self.read_exact::<4>(address)?;
        Ok(f32::from_le_bytes(bytes))
    }

    /// Read one pointer-sized value and return it as an address
    fn read_pointer(&self, address: RemoteAddress) -> Result<RemoteAddress> {
        let width = self.pointer_width();
        let bytes = self.read_bytes(address, width.bytes())?;
        width.decode(&bytes).ok_or_else(|| Error::MemoryReadFailed {
            address,
            message: format!("short read: {} of {} bytes", bytes.len(), width.bytes()),
        })
    }

    fn read_exact<const N: usize>(&self, address: RemoteAddress) -> Result<[u8; N]> {
        let bytes = self.read_bytes(address, N)?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| Error::MemoryReadFailed {
            address,
            message: format!("short read: {} of {} bytes", len, N),
        })
    }
}

/// Write access to a target process's memory.
pub trait WriteMemory {
    fn write_bytes(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()>;

    /// Overwrite instruction bytes.
    ///
    /// Backends that track page protection override this to make the code page
    /// writable for the duration of the write.
    fn patch_code(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        self.write_bytes(address, bytes)
    }

    fn write_i32(&self, address: RemoteAddress, value: i32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_f32(&self, address: RemoteAddress, value: f32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}
