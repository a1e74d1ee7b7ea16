//! In-memory stand-in for a target process, for tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::memory::{
    PointerWidth, ProcessInfo, ProcessProvider, ReadMemory, RemoteAddress, WriteMemory,
    process_name_matches,
};

pub const MOCK_MODULE_BASE: u64 = 0x1_4000_0000;
pub const MOCK_PROCESS_NAME: &str = "SonicRacingCrossWorldsSteam.exe";

#[derive(Debug)]
struct MockState {
    bytes: BTreeMap<u64, u8>,
    width: PointerWidth,
    pid: u32,
    name: String,
    module_base: Option<u64>,
    running: bool,
    open_fails: bool,
    fail_writes: bool,
    reads: usize,
    writes: usize,
    open_handles: usize,
}

/// A fake process: doubles as the provider and as the test's view of its memory.
#[derive(Debug, Clone)]
pub struct MockProcess {
    state: Rc<RefCell<MockState>>,
}

/// Handle into a [`MockProcess`]. Counts as open until dropped.
#[derive(Debug)]
pub struct MockMemory {
    state: Rc<RefCell<MockState>>,
}

enum Entry {
    Bytes(Vec<u8>),
    Pointer(u64),
}

/// Builder for [`MockProcess`]
pub struct MockProcessBuilder {
    entries: Vec<(u64, Entry)>,
    width: PointerWidth,
    pid: u32,
    name: String,
    module_base: Option<u64>,
    running: bool,
    open_fails: bool,
}

impl MockProcessBuilder {
    pub fn pointer_width(mut self, width: PointerWidth) -> Self {
        self.width = width;
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn module_base(mut self, base: u64) -> Self {
        self.module_base = Some(base);
        self
    }

    pub fn no_module_base(mut self) -> Self {
        self.module_base = None;
        self
    }

    pub fn not_running(mut self) -> Self {
        self.running = false;
        self
    }

    pub fn open_fails(mut self) -> Self {
        self.open_fails = true;
        self
    }

    pub fn bytes(mut self, address: u64, bytes: &[u8]) -> Self {
        self.entries.push((address, Entry::Bytes(bytes.to_vec())));
        self
    }

    pub fn zeroed(self, address: u64, len: usize) -> Self {
        self.bytes(address, &vec![0; len])
    }

    pub fn i32(self, address: u64, value: i32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn f32(self, address: u64, value: f32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    /// Store a pointer using the configured pointer width
    pub fn pointer(mut self, address: u64, target: u64) -> Self {
        self.entries.push((address, Entry::Pointer(target)));
        self
    }

    pub fn build(self) -> MockProcess {
        let mut bytes = BTreeMap::new();
        for (address, entry) in self.entries {
            let encoded = match entry {
                Entry::Bytes(b) => b,
                Entry::Pointer(target) => match self.width {
                    PointerWidth::Four => (target as u32).to_le_bytes().to_vec(),
                    PointerWidth::Eight => target.to_le_bytes().to_vec(),
                },
            };
            for (i, byte) in encoded.into_iter().enumerate() {
                bytes.insert(address + i as u64, byte);
            }
        }

        MockProcess {
            state: Rc::new(RefCell::new(MockState {
                bytes,
                width: self.width,
                pid: self.pid,
                name: self.name,
                module_base: self.module_base,
                running: self.running,
                open_fails: self.open_fails,
                fail_writes: false,
                reads: 0,
                writes: 0,
                open_handles: 0,
            })),
        }
    }
}

impl MockProcess {
    pub fn builder() -> MockProcessBuilder {
        MockProcessBuilder {
            entries: Vec::new(),
            width: PointerWidth::Eight,
            pid: 4242,
            name: MOCK_PROCESS_NAME.to_string(),
            module_base: Some(MOCK_MODULE_BASE),
            running: true,
            open_fails: false,
        }
    }

    /// A new handle onto this process's memory
    pub fn memory(&self) -> MockMemory {
        self.state.borrow_mut().open_handles += 1;
        MockMemory {
            state: Rc::clone(&self.state),
        }
    }

    /// Number of `read_bytes` calls made through any handle
    pub fn read_count(&self) -> usize {
        self.state.borrow().reads
    }

    /// Number of `write_bytes` calls made through any handle
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn open_handles(&self) -> usize {
        self.state.borrow().open_handles
    }

    pub fn bytes_at(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        (0..len as u64)
            .map(|i| state.bytes.get(&(address + i)).copied())
            .collect()
    }

    pub fn i32_at(&self, address: u64) -> Option<i32> {
        let bytes: [u8; 4] = self.bytes_at(address, 4)?.try_into().ok()?;
        Some(i32::from_le_bytes(bytes))
    }

    /// Simulate the game changing a value on its own
    pub fn set_i32(&self, address: u64, value: i32) {
        let mut state = self.state.borrow_mut();
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            state.bytes.insert(address + i as u64, byte);
        }
    }

    pub fn set_running(&self, running: bool) {
        self.state.borrow_mut().running = running;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn reset_counters(&self) {
        let mut state = self.state.borrow_mut();
        state.reads = 0;
        state.writes = 0;
    }
}

impl ProcessProvider for MockProcess {
    type Handle = MockMemory;

    fn find_process(&self, name: &str) -> Result<Option<ProcessInfo>> {
        let state = self.state.borrow();
        if state.running && process_name_matches(&state.name, name) {
            Ok(Some(ProcessInfo {
                pid: state.pid,
                name: state.name.clone(),
            }))
        } else {
            Ok(None)
        }
    }

    fn open_process(&self, process: &ProcessInfo) -> Result<Self::Handle> {
        if self.state.borrow().open_fails {
            return Err(Error::ProcessOpenFailed(format!(
                "access denied (pid {})",
                process.pid
            )));
        }
        Ok(self.memory())
    }

    fn module_base(&self, _handle: &Self::Handle, process: &ProcessInfo) -> Result<RemoteAddress> {
        self.state
            .borrow()
            .module_base
            .map(RemoteAddress::new)
            .ok_or(Error::ModuleBaseUnavailable(process.pid))
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: RemoteAddress, size: usize) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        if !state.running {
            return Err(Error::MemoryReadFailed {
                address,
                message: "process has exited".to_string(),
            });
        }
        (0..size as u64)
            .map(|i| state.bytes.get(&(address.value() + i)).copied())
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| Error::MemoryReadFailed {
                address,
                message: "unmapped".to_string(),
            })
    }

    fn pointer_width(&self) -> PointerWidth {
        self.state.borrow().width
    }
}

impl WriteMemory for MockMemory {
    fn write_bytes(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.writes += 1;
        let base = address.value();
        let mapped = (0..bytes.len() as u64).all(|i| state.bytes.contains_key(&(base + i)));
        if !state.running || state.fail_writes || !mapped {
            return Err(Error::MemoryWriteFailed {
                address,
                message: "write rejected".to_string(),
            });
        }
        for (i, byte) in bytes.iter().enumerate() {
            state.bytes.insert(base + i as u64, *byte);
        }
        Ok(())
    }
}

impl Drop for MockMemory {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}
