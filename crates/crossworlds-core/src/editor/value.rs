//! Tracked values and the built-in catalog.

use serde::Serialize;

use crate::editor::stability::{Reading, StabilityFilter};
use crate::memory::PointerChain;
use crate::memory::layout::tickets;

/// A game value reached through a pointer chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedValue {
    pub name: String,
    pub description: String,
    pub chain: PointerChain,
    /// Last displayed value
    pub current: i32,
    /// Value to write on the next apply
    pub pending: i32,
    stability: Option<StabilityFilter>,
}

impl TrackedValue {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        chain: PointerChain,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            chain,
            current: 0,
            pending: 0,
            stability: None,
        }
    }

    /// Mask transient zero reads with the last positive value
    pub fn with_stability_filter(mut self) -> Self {
        self.stability = Some(StabilityFilter::new());
        self
    }

    pub fn has_stability_filter(&self) -> bool {
        self.stability.is_some()
    }

    pub fn last_known_good(&self) -> Option<i32> {
        self.stability.as_ref().and_then(|f| f.last_known_good())
    }

    pub fn clear_cache(&mut self) {
        if let Some(filter) = self.stability.as_mut() {
            filter.clear();
        }
    }

    /// Record a raw reading and return what is displayed.
    ///
    /// The pending value follows the displayed one unless the user has
    /// changed it (it is 0 or still equal to the previous value).
    pub fn observe(&mut self, raw: i32) -> Reading {
        let reading = match self.stability.as_mut() {
            Some(filter) => filter.apply(raw),
            None => Reading::Unfiltered(raw),
        };

        let previous = self.current;
        self.current = reading.value();
        if self.pending == 0 || self.pending == previous {
            self.pending = self.current;
        }
        reading
    }

    pub fn snapshot(&self) -> ValueSnapshot {
        ValueSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            chain: self.chain.to_string(),
            current: self.current,
            pending: self.pending,
            last_known_good: self.last_known_good(),
        }
    }
}

/// Serializable view of a tracked value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueSnapshot {
    pub name: String,
    pub description: String,
    pub chain: String,
    pub current: i32,
    pub pending: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_known_good: Option<i32>,
}

/// The fixed set of values the editor tracks
pub fn default_catalog() -> Vec<TrackedValue> {
    vec![
        TrackedValue::new(
            tickets::NAME,
            tickets::DESCRIPTION,
            PointerChain::new(tickets::BASE_OFFSET, tickets::OFFSETS),
        )
        .with_stability_filter(),
    ]
}
