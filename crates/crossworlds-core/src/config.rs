//! Editor configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::memory::layout::{PROCESS_NAME, timing};

/// Configuration for the memory editor session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Executable name of the target process (with or without `.exe`)
    pub process_name: String,
    /// Interval between attach attempts while detached (ms)
    pub attach_interval_ms: u64,
    /// Interval between value refreshes while attached (ms)
    pub refresh_interval_ms: u64,
    /// Whether values refresh automatically while attached
    pub auto_refresh: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            process_name: PROCESS_NAME.to_string(),
            attach_interval_ms: timing::ATTACH_POLL_INTERVAL_MS,
            refresh_interval_ms: timing::REFRESH_POLL_INTERVAL_MS,
            auto_refresh: true,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration builder
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    pub fn attach_interval(&self) -> Duration {
        Duration::from_millis(self.attach_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Reject values the polling loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.process_name.trim().is_empty() {
            return Err(Error::Config("process_name must not be empty".to_string()));
        }
        if self.attach_interval_ms == 0 {
            return Err(Error::Config("attach_interval_ms must be positive".to_string()));
        }
        if self.refresh_interval_ms == 0 {
            return Err(Error::Config(
                "refresh_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for EditorConfig
#[derive(Debug, Clone, Default)]
pub struct EditorConfigBuilder {
    process_name: Option<String>,
    attach_interval_ms: Option<u64>,
    refresh_interval_ms: Option<u64>,
    auto_refresh: Option<bool>,
}

impl EditorConfigBuilder {
    /// Set the target process name
    pub fn process_name<S: Into<String>>(mut self, name: S) -> Self {
        self.process_name = Some(name.into());
        self
    }

    /// Set the attach polling interval
    pub fn attach_interval(mut self, interval: Duration) -> Self {
        self.attach_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Set the refresh polling interval
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Enable or disable automatic refresh
    pub fn auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> EditorConfig {
        let default = EditorConfig::default();
        EditorConfig {
            process_name: self.process_name.unwrap_or(default.process_name),
            attach_interval_ms: self
                .attach_interval_ms
                .unwrap_or(default.attach_interval_ms),
            refresh_interval_ms: self
                .refresh_interval_ms
                .unwrap_or(default.refresh_interval_ms),
            auto_refresh: self.auto_refresh.unwrap_or(default.auto_refresh),
        }
    }
}
