//! Win32 process backend built on Toolhelp snapshots and Read/WriteProcessMemory.

use std::ffi::c_void;
use std::mem::size_of;

use tracing::{debug, warn};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::Debug::{
    FlushInstructionCache, ReadProcessMemory, WriteProcessMemory,
};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CREATE_TOOLHELP_SNAPSHOT_FLAGS, CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW,
    Module32NextW, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPMODULE,
    TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Memory::{
    PAGE_EXECUTE_READWRITE, PAGE_PROTECTION_FLAGS, VirtualProtectEx,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};

use crate::error::{Error, Result};
use crate::memory::{
    ProcessInfo, ProcessProvider, ReadMemory, RemoteAddress, WriteMemory, process_name_matches,
};

/// Process lookup through the Toolhelp API
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsProcesses;

/// An open process handle. Closed on drop.
#[derive(Debug)]
pub struct ProcessHandle {
    handle: HANDLE,
    pub pid: u32,
}

/// Toolhelp snapshot handle, closed on drop
struct Snapshot(HANDLE);

impl Snapshot {
    fn new(flags: CREATE_TOOLHELP_SNAPSHOT_FLAGS, pid: u32) -> Result<Self> {
        // SAFETY: CreateToolhelp32Snapshot has no pointer arguments.
        let handle = unsafe { CreateToolhelp32Snapshot(flags, pid) }
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        Ok(Self(handle))
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateToolhelp32Snapshot and is closed once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

impl ProcessProvider for WindowsProcesses {
    type Handle = ProcessHandle;

    fn find_process(&self, name: &str) -> Result<Option<ProcessInfo>> {
        let snapshot = Snapshot::new(TH32CS_SNAPPROCESS, 0)?;
        let mut entry = PROCESSENTRY32W {
            dwSize: size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry is a properly sized PROCESSENTRY32W owned by this frame.
        if unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_err() {
            return Ok(None);
        }

        loop {
            let exe_name = wide_to_string(&entry.szExeFile);
            if process_name_matches(&exe_name, name) {
                debug!("Found {} (pid {})", exe_name, entry.th32ProcessID);
                return Ok(Some(ProcessInfo {
                    pid: entry.th32ProcessID,
                    name: exe_name,
                }));
            }
            // SAFETY: same entry buffer as above.
            if unsafe { Process32NextW(snapshot.0, &mut entry) }.is_err() {
                return Ok(None);
            }
        }
    }

    fn open_process(&self, process: &ProcessInfo) -> Result<Self::Handle> {
        // SAFETY: OpenProcess has no pointer arguments; the handle is owned by ProcessHandle.
        let handle = unsafe { OpenProcess(PROCESS_ALL_ACCESS, false, process.pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("pid {}: {}", process.pid, e)))?;
        Ok(ProcessHandle {
            handle,
            pid: process.pid,
        })
    }

    fn module_base(&self, _handle: &Self::Handle, process: &ProcessInfo) -> Result<RemoteAddress> {
        let snapshot = Snapshot::new(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, process.pid)
            .map_err(|_| Error::ModuleBaseUnavailable(process.pid))?;
        let mut entry = MODULEENTRY32W {
            dwSize: size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry is a properly sized MODULEENTRY32W owned by this frame.
        if unsafe { Module32FirstW(snapshot.0, &mut entry) }.is_err() {
            return Err(Error::ModuleBaseUnavailable(process.pid));
        }

        // The first module is the executable image; prefer an exact name match anyway.
        let first = entry.modBaseAddr as u64;
        loop {
            if process_name_matches(&wide_to_string(&entry.szModule), &process.name) {
                let base = entry.modBaseAddr as u64;
                if base == 0 {
                    break;
                }
                return Ok(RemoteAddress::new(base));
            }
            // SAFETY: same entry buffer as above.
            if unsafe { Module32NextW(snapshot.0, &mut entry) }.is_err() {
                break;
            }
        }

        if first == 0 {
            return Err(Error::ModuleBaseUnavailable(process.pid));
        }
        Ok(RemoteAddress::new(first))
    }
}

impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: RemoteAddress, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut read = 0usize;
        // SAFETY: buffer holds `size` bytes; the OS validates the remote range.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address.value() as *const c_void,
                buffer.as_mut_ptr().cast(),
                size,
                Some(&mut read),
            )
        }
        .map_err(|e| Error::MemoryReadFailed {
            address,
            message: e.to_string(),
        })?;

        if read != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("short read: {} of {} bytes", read, size),
            });
        }
        Ok(buffer)
    }
}

impl WriteMemory for ProcessHandle {
    fn write_bytes(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        let mut written = 0usize;
        // SAFETY: `bytes` is a live slice of the given length.
        unsafe {
            WriteProcessMemory(
                self.handle,
                address.value() as *const c_void,
                bytes.as_ptr().cast(),
                bytes.len(),
                Some(&mut written),
            )
        }
        .map_err(|e| Error::MemoryWriteFailed {
            address,
            message: e.to_string(),
        })?;

        if written != bytes.len() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: format!("short write: {} of {} bytes", written, bytes.len()),
            });
        }
        Ok(())
    }

    fn patch_code(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        let target = address.value() as *const c_void;
        let mut previous = PAGE_PROTECTION_FLAGS(0);

        // SAFETY: only changes protection of the remote pages covering the patch.
        unsafe {
            VirtualProtectEx(
                self.handle,
                target,
                bytes.len(),
                PAGE_EXECUTE_READWRITE,
                &mut previous,
            )
        }
        .map_err(|e| Error::MemoryWriteFailed {
            address,
            message: format!("VirtualProtectEx: {}", e),
        })?;

        let result = self.write_bytes(address, bytes);

        let mut ignored = PAGE_PROTECTION_FLAGS(0);
        // SAFETY: restores the protection captured above on the same range.
        if let Err(e) =
            unsafe { VirtualProtectEx(self.handle, target, bytes.len(), previous, &mut ignored) }
        {
            warn!("Failed to restore page protection at {}: {}", address, e);
        }

        // SAFETY: flushes the remote instruction cache for the patched range.
        if let Err(e) = unsafe { FlushInstructionCache(self.handle, Some(target), bytes.len()) } {
            debug!("FlushInstructionCache failed at {}: {}", address, e);
        }

        result
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from OpenProcess and is closed exactly once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
        debug!("Closed handle to pid {}", self.pid);
    }
}
