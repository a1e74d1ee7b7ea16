mod address;
pub mod layout;
mod pointer;
mod process;
mod reader;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(test)]
pub mod mock;

pub use address::{PointerWidth, RemoteAddress};
pub use pointer::{PointerChain, resolve};
pub use process::*;
pub use reader::{ReadMemory, WriteMemory};

#[cfg(target_os = "windows")]
pub use self::windows::{ProcessHandle, WindowsProcesses};

#[cfg(test)]
pub use mock::{MockMemory, MockProcess};
