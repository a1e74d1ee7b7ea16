//! Masking of transient zero reads.
//!
//! While the tickets menu is open the game swaps an unrelated, zeroed object
//! in at the resolved address. A zero after a positive reading is therefore
//! treated as a bad read and the last positive value is shown instead.
//!
//! A real drop to exactly zero is indistinguishable from that case and will
//! show the stale value until a positive reading arrives.

/// Result of passing one raw reading through the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// Positive reading, cache updated
    Fresh(i32),
    /// Zero reading replaced with the cached value
    Cached(i32),
    /// Passed through untouched (zero before any positive reading, or negative)
    Unfiltered(i32),
}

impl Reading {
    pub fn value(self) -> i32 {
        match self {
            Reading::Fresh(v) | Reading::Cached(v) | Reading::Unfiltered(v) => v,
        }
    }

    pub fn is_cached(self) -> bool {
        matches!(self, Reading::Cached(_))
    }
}

/// Last-known-good cache for one value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilityFilter {
    last_known_good: Option<i32>,
}

impl StabilityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, raw: i32) -> Reading {
        match (raw, self.last_known_good) {
            (0, Some(cached)) => Reading::Cached(cached),
            (v, _) if v > 0 => {
                self.last_known_good = Some(v);
                Reading::Fresh(v)
            }
            (v, _) => Reading::Unfiltered(v),
        }
    }

    pub fn last_known_good(&self) -> Option<i32> {
        self.last_known_good
    }

    /// Forget the cache (e.g., when the attachment ends)
    pub fn clear(&mut self) {
        self.last_known_good = None;
    }
}
