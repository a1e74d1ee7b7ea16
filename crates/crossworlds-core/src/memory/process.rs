//! Process discovery and the platform backend seam.

use crate::error::{Error, Result};
use crate::memory::{ReadMemory, RemoteAddress, WriteMemory};

/// A running process that matched a name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Executable name as reported by the OS (e.g. `SonicRacingCrossWorldsSteam.exe`)
    pub name: String,
}

/// Finds processes and opens handles to them.
///
/// The handle type owns the OS resource and releases it on drop.
pub trait ProcessProvider {
    type Handle: ReadMemory + WriteMemory;

    /// Return the first process whose executable matches `name`, if any.
    fn find_process(&self, name: &str) -> Result<Option<ProcessInfo>>;

    /// Open `process` with full access rights.
    fn open_process(&self, process: &ProcessInfo) -> Result<Self::Handle>;

    /// Load address of the main module of an opened process.
    fn module_base(&self, handle: &Self::Handle, process: &ProcessInfo) -> Result<RemoteAddress>;

    fn is_running(&self, name: &str) -> bool {
        matches!(self.find_process(name), Ok(Some(_)))
    }
}

/// Compare an OS executable name against a configured process name.
///
/// Case-insensitive, and a trailing `.exe` on either side is ignored.
pub fn process_name_matches(exe_name: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> &str {
        let name = name.trim();
        match name.len().checked_sub(4) {
            Some(split)
                if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".exe") =>
            {
                &name[..split]
            }
            _ => name,
        }
    }
    stem(exe_name).eq_ignore_ascii_case(stem(wanted))
}

/// The process backend for the current platform
#[cfg(target_os = "windows")]
pub type SystemProcesses = crate::memory::WindowsProcesses;

/// The process backend for the current platform
#[cfg(not(target_os = "windows"))]
pub type SystemProcesses = UnsupportedProcesses;

/// Backend for platforms without process memory access. Every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProcesses;

/// Handle type of [`UnsupportedProcesses`]; it can never be constructed.
#[derive(Debug)]
pub enum UnsupportedHandle {}

impl ReadMemory for UnsupportedHandle {
    fn read_bytes(&self, _address: RemoteAddress, _size: usize) -> Result<Vec<u8>> {
        match *self {}
    }
}

impl WriteMemory for UnsupportedHandle {
    fn write_bytes(&self, _address: RemoteAddress, _bytes: &[u8]) -> Result<()> {
        match *self {}
    }
}

impl ProcessProvider for UnsupportedProcesses {
    type Handle = UnsupportedHandle;

    fn find_process(&self, _name: &str) -> Result<Option<ProcessInfo>> {
        Err(Error::Unsupported)
    }

    fn open_process(&self, _process: &ProcessInfo) -> Result<Self::Handle> {
        Err(Error::Unsupported)
    }

    fn module_base(&self, handle: &Self::Handle, _process: &ProcessInfo) -> Result<RemoteAddress> {
        match *handle {}
    }
}
