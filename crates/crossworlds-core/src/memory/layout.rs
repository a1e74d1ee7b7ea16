//! Memory layout constants for Sonic Racing CrossWorlds (Steam build)
//!
//! Every value here was reverse-engineered from the game binary and will move
//! when the game is updated.

/// Executable name of the target process
pub const PROCESS_NAME: &str = "SonicRacingCrossWorldsSteam";

/// Ticket balance (in-game currency)
pub mod tickets {
    pub const NAME: &str = "Tickets";
    pub const DESCRIPTION: &str = "In-game currency for purchases";

    /// Module-relative root of the ticket pointer chain
    pub const BASE_OFFSET: u64 = 0x086C_F928;

    /// Offsets applied after each dereference; the last one lands on the i32 balance
    pub const OFFSETS: [i64; 6] = [0xD8, 0x70, 0x108, 0x2D8, 0xD8, 0x58];
}

/// Instruction patch that stops ticket spending
pub mod freeze {
    /// Module-relative address of `mov [rsi+58],ebx`, the ticket balance store
    pub const TARGET_OFFSET: u64 = 0x4D4_8DCD;

    /// Patch length in bytes
    pub const PATCH_LEN: usize = 3;

    /// `nop; nop; nop`
    pub const NOP_BYTES: [u8; PATCH_LEN] = [0x90, 0x90, 0x90];

    /// `mov [rsi+58],ebx`
    pub const ORIGINAL_BYTES: [u8; PATCH_LEN] = [0x89, 0x5E, 0x58];
}

/// Timing constants for the polling tasks
pub mod timing {
    /// Interval between attach attempts while detached (ms)
    pub const ATTACH_POLL_INTERVAL_MS: u64 = 2000;

    /// Interval between value refreshes while attached (ms)
    pub const REFRESH_POLL_INTERVAL_MS: u64 = 1000;
}
