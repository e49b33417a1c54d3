//! Polling configuration.
//!
//! Defaults are constants; a host can override them by handing over a
//! `PollingConfig` parsed from its own settings JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

// ============================================================================
// Polling Intervals
// ============================================================================

/// Interval between checks that the selected device is still attached.
pub const DEVICE_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Interval between backend progress reads while a job is running.
pub const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// Messages
// ============================================================================

/// Message surfaced when a producer fails with an empty error.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

fn default_device_poll_interval_ms() -> u64 {
    DEVICE_POLL_INTERVAL.as_millis() as u64
}

fn default_progress_poll_interval_ms() -> u64 {
    PROGRESS_POLL_INTERVAL.as_millis() as u64
}

fn default_true() -> bool {
    true
}

/// Host-supplied overrides for the monitors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    /// Period of the device-presence monitor in milliseconds.
    #[serde(default = "default_device_poll_interval_ms")]
    pub device_poll_interval_ms: u64,

    /// Period of the progress monitor in milliseconds.
    #[serde(default = "default_progress_poll_interval_ms")]
    pub progress_poll_interval_ms: u64,

    /// When false, the device monitor never polls.
    #[serde(default = "default_true")]
    pub device_monitor_enabled: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            device_poll_interval_ms: default_device_poll_interval_ms(),
            progress_poll_interval_ms: default_progress_poll_interval_ms(),
            device_monitor_enabled: true,
        }
    }
}

impl PollingConfig {
    /// Parse and validate a config, returning defaults for blank input.
    pub fn from_json(contents: &str) -> SyncResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: PollingConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject intervals a timer cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.device_poll_interval_ms == 0 {
            return Err(SyncError::InvalidConfig {
                reason: "devicePollIntervalMs must be greater than zero".to_string(),
            });
        }
        if self.progress_poll_interval_ms == 0 {
            return Err(SyncError::InvalidConfig {
                reason: "progressPollIntervalMs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn device_poll_interval(&self) -> Duration {
        Duration::from_millis(self.device_poll_interval_ms)
    }

    pub fn progress_poll_interval(&self) -> Duration {
        Duration::from_millis(self.progress_poll_interval_ms)
    }
}
