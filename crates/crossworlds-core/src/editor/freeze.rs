//! Ticket freeze: replaces the balance store instruction with no-ops.

use tracing::{info, warn};

use crate::attach::AttachmentManager;
use crate::error::Result;
use crate::memory::ProcessProvider;
use crate::memory::layout::freeze::{NOP_BYTES, ORIGINAL_BYTES, PATCH_LEN, TARGET_OFFSET};

/// A fixed-size instruction patch at a module-relative address.
///
/// Only ever writes one of its two full byte sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezePatch {
    target_offset: u64,
    patched: [u8; PATCH_LEN],
    original: [u8; PATCH_LEN],
    frozen: bool,
}

impl FreezePatch {
    pub fn new(target_offset: u64, patched: [u8; PATCH_LEN], original: [u8; PATCH_LEN]) -> Self {
        Self {
            target_offset,
            patched,
            original,
            frozen: false,
        }
    }

    /// The ticket spend patch
    pub fn tickets() -> Self {
        Self::new(TARGET_OFFSET, NOP_BYTES, ORIGINAL_BYTES)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn target_offset(&self) -> u64 {
        self.target_offset
    }

    pub fn patched_bytes(&self) -> &[u8; PATCH_LEN] {
        &self.patched
    }

    pub fn original_bytes(&self) -> &[u8; PATCH_LEN] {
        &self.original
    }

    /// Flip between patched and original bytes.
    ///
    /// Returns `Ok(false)` when the write fails; the frozen flag then stays as it was.
    pub fn toggle<P: ProcessProvider>(&mut self, manager: &AttachmentManager<P>) -> Result<bool> {
        let address = manager.module_address(self.target_offset)?;
        let bytes = if self.frozen {
            &self.original
        } else {
            &self.patched
        };

        if !manager.patch_code(address, bytes)? {
            warn!(
                "Failed to {} patch at {}",
                if self.frozen { "remove" } else { "apply" },
                address
            );
            return Ok(false);
        }

        self.frozen = !self.frozen;
        info!(
            "Freeze patch at {} {}",
            address,
            if self.frozen { "applied" } else { "removed" }
        );
        Ok(true)
    }

    /// Put the original bytes back if frozen, then clear the flag unconditionally.
    ///
    /// Returns whether the target is known to be unpatched.
    pub fn release<P: ProcessProvider>(&mut self, manager: &AttachmentManager<P>) -> bool {
        if !self.frozen {
            return true;
        }
        self.frozen = false;

        let restored = manager
            .module_address(self.target_offset)
            .and_then(|address| manager.patch_code(address, &self.original));
        match restored {
            Ok(true) => {
                info!("Restored original bytes before detach");
                true
            }
            Ok(false) => {
                warn!("Could not restore original bytes; process may have exited");
                false
            }
            Err(e) => {
                warn!("Could not restore original bytes: {}", e);
                false
            }
        }
    }
}
