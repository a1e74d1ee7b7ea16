//! Memory editor session.
//!
//! [`MemoryEditor`] ties the attachment, the tracked-value catalog and the
//! freeze patch together and drives two polling tasks:
//! - attach search: runs while detached, stops itself once attached
//! - value refresh: runs while attached with auto-refresh on, and turns a
//!   vanished process into a full detach
//!
//! Everything runs on the caller's thread; `tick` is the only scheduler.
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Instant;
//! use crossworlds_core::{EditorConfig, MemoryEditor, SystemProcesses};
//!
//! let mut editor = MemoryEditor::new(SystemProcesses::default(), EditorConfig::default());
//! editor.start(Instant::now());
//! loop {
//!     editor.tick(Instant::now());
//!     println!("{}", editor.status());
//! }
//! ```

mod freeze;
mod schedule;
mod stability;
mod value;

use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::attach::{AttachmentManager, ProcessStatus};
use crate::config::EditorConfig;
use crate::error::Error;
use crate::memory::ProcessProvider;

pub use freeze::FreezePatch;
pub use schedule::PollTask;
pub use stability::{Reading, StabilityFilter};
pub use value::{TrackedValue, ValueSnapshot, default_catalog};

/// Result of a refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// All values were read fresh
    Refreshed,
    /// At least one value fell back to its last known good reading
    UsedCache,
    /// Nothing to refresh
    NotAttached,
}

/// What a scheduler tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    AttachFailed,
    Attached,
    Refreshed(RefreshOutcome),
    /// The target exited and the session was torn down
    ProcessExited,
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub struct MemoryEditor<P: ProcessProvider> {
    config: EditorConfig,
    manager: AttachmentManager<P>,
    values: Vec<TrackedValue>,
    freeze: FreezePatch,
    selected: Option<usize>,
    auto_refresh: bool,
    status: String,
    attach_task: PollTask,
    refresh_task: PollTask,
}

impl<P: ProcessProvider> MemoryEditor<P> {
    /// Create an editor with the built-in catalog. Call [`start`](Self::start) to begin searching.
    pub fn new(provider: P, config: EditorConfig) -> Self {
        Self::with_catalog(provider, config, default_catalog())
    }

    pub fn with_catalog(provider: P, config: EditorConfig, values: Vec<TrackedValue>) -> Self {
        let selected = if values.is_empty() { None } else { Some(0) };
        Self {
            manager: AttachmentManager::new(provider, config.process_name.clone()),
            values,
            freeze: FreezePatch::tickets(),
            selected,
            auto_refresh: config.auto_refresh,
            status: "Searching for game process...".to_string(),
            attach_task: PollTask::new(config.attach_interval()),
            refresh_task: PollTask::new(config.refresh_interval()),
            config,
        }
    }

    /// Start the attach search and make a first attempt right away
    pub fn start(&mut self, now: Instant) -> bool {
        self.attach_task.start(now);
        self.try_auto_attach(now)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn values(&self) -> &[TrackedValue] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&TrackedValue> {
        self.values.get(index)
    }

    /// Index of the first value with the given name (case-insensitive)
    pub fn find_value(&self, name: &str) -> Option<usize> {
        self.values
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn snapshots(&self) -> Vec<ValueSnapshot> {
        self.values.iter().map(TrackedValue::snapshot).collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.values.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn set_pending(&mut self, index: usize, value: i32) -> bool {
        match self.values.get_mut(index) {
            Some(tracked) => {
                tracked.pending = value;
                true
            }
            None => false,
        }
    }

    pub fn manager(&self) -> &AttachmentManager<P> {
        &self.manager
    }

    pub fn freeze_patch(&self) -> &FreezePatch {
        &self.freeze
    }

    pub fn is_attached(&self) -> bool {
        self.manager.is_attached()
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn process_status(&self) -> ProcessStatus {
        self.manager.process_status()
    }

    pub fn attach_task(&self) -> &PollTask {
        &self.attach_task
    }

    pub fn refresh_task(&self) -> &PollTask {
        &self.refresh_task
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.attach_task.next_due(), self.refresh_task.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn can_attach(&self) -> bool {
        !self.is_attached()
    }

    pub fn can_detach(&self) -> bool {
        self.is_attached()
    }

    pub fn can_refresh(&self) -> bool {
        self.is_attached()
    }

    pub fn can_apply(&self) -> bool {
        self.is_attached() && self.selected.is_some()
    }

    pub fn can_toggle_freeze(&self) -> bool {
        self.is_attached()
    }

    /// User-initiated attach
    pub fn attach(&mut self, now: Instant) -> bool {
        self.attach_with(now, "Failed to attach. Make sure the game is running.")
    }

    /// Attach attempt made by the search task
    pub fn try_auto_attach(&mut self, now: Instant) -> bool {
        self.attach_with(now, "Waiting for game to start...")
    }

    fn attach_with(&mut self, now: Instant, not_found_status: &str) -> bool {
        if self.is_attached() {
            return true;
        }

        match self.manager.attach() {
            Ok(()) => {
                self.status = "Successfully attached to game process".to_string();
                self.attach_task.stop();
                self.refresh();
                if self.auto_refresh {
                    self.refresh_task.start(now);
                }
                true
            }
            Err(Error::ProcessNotFound(_)) => {
                self.status = not_found_status.to_string();
                false
            }
            Err(e) => {
                debug!("Attach attempt failed: {}", e);
                self.status = format!("Error while searching for game: {}", e);
                false
            }
        }
    }

    /// Read every tracked value once
    pub fn refresh(&mut self) -> RefreshOutcome {
        if !self.is_attached() {
            return RefreshOutcome::NotAttached;
        }

        let mut used_cache = false;
        for tracked in &mut self.values {
            let raw = match self.manager.read_i32(&tracked.chain) {
                Ok(raw) => raw,
                Err(e) => {
                    self.status = format!("Error reading values: {}", e);
                    return RefreshOutcome::NotAttached;
                }
            };
            let reading = tracked.observe(raw);
            if reading.is_cached() {
                debug!(
                    "{} read 0, showing cached {}",
                    tracked.name,
                    reading.value()
                );
                used_cache = true;
            }
        }

        if used_cache {
            self.status = format!(
                "Using cached value (tickets menu may be active) - {}",
                timestamp()
            );
            RefreshOutcome::UsedCache
        } else {
            self.status = format!("Values refreshed at {}", timestamp());
            RefreshOutcome::Refreshed
        }
    }

    /// Write the pending value of the selected entry
    pub fn apply_selected(&mut self) -> bool {
        match self.selected {
            Some(index) => self.apply(index),
            None => false,
        }
    }

    /// Write the pending value of `index`
    pub fn apply(&mut self, index: usize) -> bool {
        let Some(tracked) = self.values.get_mut(index) else {
            return false;
        };

        match self.manager.write_i32(&tracked.chain, tracked.pending) {
            Ok(true) => {
                tracked.current = tracked.pending;
                info!("Set {} to {}", tracked.name, tracked.pending);
                self.status = format!(
                    "Successfully updated {} to {}",
                    tracked.name, tracked.pending
                );
                true
            }
            Ok(false) => {
                warn!("Write to {} failed", tracked.name);
                self.status = format!("Failed to update {}", tracked.name);
                false
            }
            Err(e) => {
                self.status = format!("Error writing value: {}", e);
                false
            }
        }
    }

    /// Toggle the ticket freeze patch
    pub fn toggle_freeze(&mut self) -> bool {
        let was_frozen = self.freeze.is_frozen();
        match self.freeze.toggle(&self.manager) {
            Ok(true) => {
                self.status = if self.freeze.is_frozen() {
                    "Tickets frozen - unlimited tickets enabled!".to_string()
                } else {
                    "Tickets unfrozen".to_string()
                };
                true
            }
            Ok(false) => {
                self.status = if was_frozen {
                    "Failed to unfreeze tickets".to_string()
                } else {
                    "Failed to freeze tickets".to_string()
                };
                false
            }
            Err(e) => {
                self.status = format!("Error toggling freeze: {}", e);
                false
            }
        }
    }

    pub fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        self.auto_refresh = enabled;
        if enabled && self.is_attached() {
            self.refresh_task.start(now);
        } else {
            self.refresh_task.stop();
        }
    }

    /// User-initiated detach; the attach search starts again
    pub fn detach(&mut self, now: Instant) {
        if !self.is_attached() {
            return;
        }
        self.teardown();
        self.status = "Detached from game process. Searching for game...".to_string();
        self.attach_task.start(now);
    }

    /// Detach for application exit; nothing is restarted
    pub fn shutdown(&mut self) {
        self.teardown();
        self.attach_task.stop();
        self.status = "Detached from game process".to_string();
    }

    /// Restore the patch, release the handle and drop every cache
    fn teardown(&mut self) {
        self.refresh_task.stop();
        self.freeze.release(&self.manager);
        self.manager.detach();
        for tracked in &mut self.values {
            tracked.clear_cache();
        }
    }

    /// Run whichever polling task is due
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.attach_task.fire(now) {
            return if self.try_auto_attach(now) {
                TickOutcome::Attached
            } else {
                TickOutcome::AttachFailed
            };
        }

        if !self.refresh_task.fire(now) || !self.is_attached() || !self.auto_refresh {
            return TickOutcome::Idle;
        }

        if !self.manager.is_process_running() {
            info!("Target process exited");
            self.teardown();
            self.status = "Game closed. Waiting for game to start...".to_string();
            self.attach_task.start(now);
            return TickOutcome::ProcessExited;
        }

        TickOutcome::Refreshed(self.refresh())
    }
}

impl<P: ProcessProvider> Drop for MemoryEditor<P> {
    fn drop(&mut self) {
        if self.freeze.is_frozen() {
            self.freeze.release(&self.manager);
        }
    }
}
