use thiserror::Error;

use crate::memory::RemoteAddress;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to resolve module base address of process {0}")]
    ModuleBaseUnavailable(u32),

    #[error("Not attached to process")]
    NotAttached,

    #[error("Failed to read process memory at address {address}: {message}")]
    MemoryReadFailed {
        address: RemoteAddress,
        message: String,
    },

    #[error("Failed to write process memory at address {address}: {message}")]
    MemoryWriteFailed {
        address: RemoteAddress,
        message: String,
    },

    #[error("Address arithmetic overflowed: {base} + {offset}")]
    AddressOverflow { base: RemoteAddress, offset: i64 },

    #[error("Null pointer in chain at link {0}")]
    NullPointer(usize),

    #[error("Process access is not supported on this platform")]
    Unsupported,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error means the accessor was used without an attachment
    pub fn is_not_attached(&self) -> bool {
        matches!(self, Error::NotAttached)
    }

    /// Check if this error came from walking or touching remote memory
    pub fn is_memory_access(&self) -> bool {
        matches!(
            self,
            Error::MemoryReadFailed { .. }
                | Error::MemoryWriteFailed { .. }
                | Error::AddressOverflow { .. }
                | Error::NullPointer(_)
        )
    }
}
