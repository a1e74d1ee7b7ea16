//! Process attachment and value access.
//!
//! [`AttachmentManager`] owns the only handle to the target process. Every
//! read, write and patch goes through it, so nothing can outlive a detach.

use strum::Display;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::{
    PointerChain, PointerWidth, ProcessProvider, ReadMemory, RemoteAddress, WriteMemory, resolve,
};

/// A live attachment to the target process
#[derive(Debug)]
pub struct ProcessAttachment<H> {
    handle: H,
    pub pid: u32,
    /// Load address of the main module; never null
    pub module_base: RemoteAddress,
    pub pointer_width: PointerWidth,
}

/// Coarse process state for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProcessStatus {
    #[strum(serialize = "Process not running")]
    NotRunning,
    #[strum(serialize = "Attached")]
    Attached,
    #[strum(serialize = "Process running (not attached)")]
    RunningDetached,
}

pub struct AttachmentManager<P: ProcessProvider> {
    provider: P,
    process_name: String,
    attachment: Option<ProcessAttachment<P::Handle>>,
}

impl<P: ProcessProvider> AttachmentManager<P> {
    pub fn new(provider: P, process_name: impl Into<String>) -> Self {
        Self {
            provider,
            process_name: process_name.into(),
            attachment: None,
        }
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    pub fn attachment(&self) -> Option<&ProcessAttachment<P::Handle>> {
        self.attachment.as_ref()
    }

    /// Attach to the first process matching the configured name.
    ///
    /// Either fully succeeds or leaves the manager detached with no handle open.
    /// Attaching while already attached is a no-op.
    pub fn attach(&mut self) -> Result<()> {
        if self.is_attached() {
            return Ok(());
        }

        let process = self
            .provider
            .find_process(&self.process_name)?
            .ok_or_else(|| Error::ProcessNotFound(self.process_name.clone()))?;

        let handle = self.provider.open_process(&process)?;

        // An early return here drops `handle`, which closes it.
        let module_base = self.provider.module_base(&handle, &process)?;
        if module_base.is_null() {
            return Err(Error::ModuleBaseUnavailable(process.pid));
        }

        let pointer_width = handle.pointer_width();
        info!(
            "Attached to {} (pid {}, base: {}, {}-byte pointers)",
            process.name,
            process.pid,
            module_base,
            pointer_width.bytes()
        );

        self.attachment = Some(ProcessAttachment {
            handle,
            pid: process.pid,
            module_base,
            pointer_width,
        });
        Ok(())
    }

    /// Release the handle. Returns whether an attachment was held.
    pub fn detach(&mut self) -> bool {
        match self.attachment.take() {
            Some(attachment) => {
                info!("Detached from pid {}", attachment.pid);
                true
            }
            None => false,
        }
    }

    /// Whether the target is running, attached or not
    pub fn is_process_running(&self) -> bool {
        self.provider.is_running(&self.process_name)
    }

    pub fn process_status(&self) -> ProcessStatus {
        if !self.is_process_running() {
            ProcessStatus::NotRunning
        } else if self.is_attached() {
            ProcessStatus::Attached
        } else {
            ProcessStatus::RunningDetached
        }
    }

    fn session(&self) -> Result<&ProcessAttachment<P::Handle>> {
        self.attachment.as_ref().ok_or(Error::NotAttached)
    }

    /// Absolute address of a module-relative offset
    pub fn module_address(&self, offset: u64) -> Result<RemoteAddress> {
        let session = self.session()?;
        session
            .module_base
            .checked_add(offset)
            .ok_or(Error::AddressOverflow {
                base: session.module_base,
                offset: offset as i64,
            })
    }

    /// Resolve `chain` against the attached module
    pub fn resolve(&self, chain: &PointerChain) -> Result<RemoteAddress> {
        let session = self.session()?;
        resolve(&session.handle, session.module_base, chain)
    }

    /// Read an i32 through `chain`, reporting why it failed
    pub fn try_read_i32(&self, chain: &PointerChain) -> Result<i32> {
        let session = self.session()?;
        let address = resolve(&session.handle, session.module_base, chain)?;
        session.handle.read_i32(address)
    }

    /// Read an i32 through `chain`.
    ///
    /// Any failure other than being detached reads as 0; a genuine zero and a
    /// failed read look the same here.
    pub fn read_i32(&self, chain: &PointerChain) -> Result<i32> {
        self.try_read_i32(chain).or_else(|e| unavailable(e, 0))
    }

    pub fn try_read_f32(&self, chain: &PointerChain) -> Result<f32> {
        let session = self.session()?;
        let address = resolve(&session.handle, session.module_base, chain)?;
        session.handle.read_f32(address)
    }

    /// Float counterpart of [`read_i32`](Self::read_i32)
    pub fn read_f32(&self, chain: &PointerChain) -> Result<f32> {
        self.try_read_f32(chain).or_else(|e| unavailable(e, 0.0))
    }

    /// Write an i32 through `chain`. `Ok(false)` when resolution or the write fails.
    pub fn write_i32(&self, chain: &PointerChain, value: i32) -> Result<bool> {
        let session = self.session()?;
        let written = resolve(&session.handle, session.module_base, chain)
            .and_then(|address| session.handle.write_i32(address, value));
        written.map(|_| true).or_else(|e| unavailable(e, false))
    }

    pub fn write_f32(&self, chain: &PointerChain, value: f32) -> Result<bool> {
        let session = self.session()?;
        let written = resolve(&session.handle, session.module_base, chain)
            .and_then(|address| session.handle.write_f32(address, value));
        written.map(|_| true).or_else(|e| unavailable(e, false))
    }

    /// Raw read at an absolute address
    pub fn read_bytes(&self, address: RemoteAddress, size: usize) -> Result<Vec<u8>> {
        self.session()?.handle.read_bytes(address, size)
    }

    /// Raw write at an absolute address. `Ok(false)` when the OS rejects it.
    pub fn write_bytes(&self, address: RemoteAddress, bytes: &[u8]) -> Result<bool> {
        let session = self.session()?;
        session
            .handle
            .write_bytes(address, bytes)
            .map(|_| true)
            .or_else(|e| unavailable(e, false))
    }

    /// Overwrite instruction bytes at an absolute address
    pub fn patch_code(&self, address: RemoteAddress, bytes: &[u8]) -> Result<bool> {
        let session = self.session()?;
        session
            .handle
            .patch_code(address, bytes)
            .map(|_| true)
            .or_else(|e| unavailable(e, false))
    }
}

fn unavailable<T>(error: Error, fallback: T) -> Result<T> {
    if error.is_not_attached() {
        return Err(error);
    }
    debug!("Memory access failed: {}", error);
    Ok(fallback)
}
