//! # crossworlds-core
//!
//! Core library for the CrossWorlds memory editor.
//!
//! This crate provides:
//! - Process attachment and Windows process memory access
//! - Pointer-chain resolution over 4- and 8-byte pointers
//! - The tracked-value catalog with a stability filter for transient zero reads
//! - The ticket freeze patch and its restore-on-detach guarantee
//! - An editor session that drives the attach-search and value-refresh polling tasks

pub mod attach;
pub mod config;
pub mod editor;
pub mod error;
pub mod memory;

pub use attach::{AttachmentManager, ProcessAttachment, ProcessStatus};
pub use config::{EditorConfig, EditorConfigBuilder};
pub use editor::{
    FreezePatch, MemoryEditor, PollTask, Reading, RefreshOutcome, StabilityFilter, TickOutcome,
    TrackedValue, ValueSnapshot, default_catalog,
};
pub use error::{Error, Result};
pub use memory::{
    PointerChain, PointerWidth, ProcessInfo, ProcessProvider, ReadMemory, RemoteAddress,
    SystemProcesses, WriteMemory, resolve,
};
