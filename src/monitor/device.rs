//! Watches that the selected storage device is still attached.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::interval::{CheckOutcome, IntervalMonitor, PollFence};
use crate::backend::is_device_present;
use crate::config::{PollingConfig, DEVICE_POLL_INTERVAL};
use crate::error::SyncResult;
use crate::traits::{DeviceSource, Scheduler};

/// Polls the device list and reports when the selected device disappears.
///
/// The disconnect callback fires on every poll that finds the device missing;
/// clearing the selection afterwards is up to the caller.
pub struct DeviceMonitor {
    monitor: IntervalMonitor,
    source: Arc<dyn DeviceSource>,
    period: Duration,
    enabled: bool,
}

impl DeviceMonitor {
    pub fn new(source: Arc<dyn DeviceSource>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            monitor: IntervalMonitor::new("device", scheduler),
            source,
            period: DEVICE_POLL_INTERVAL,
            enabled: true,
        }
    }

    /// Apply host overrides for period and enablement.
    pub fn with_config(mut self, config: &PollingConfig) -> Self {
        self.period = config.device_poll_interval();
        self.enabled = config.device_monitor_enabled;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Re-evaluate the watch for the current selection.
    ///
    /// Any previous watch is stopped first. Polling only starts, with an
    /// immediate check, when monitoring is enabled and a device is selected.
    pub fn watch<F>(
        &self,
        selected: Option<&str>,
        enabled: bool,
        on_disconnect: F,
    ) -> SyncResult<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.monitor.stop();

        let Some(selected) = selected else {
            return Ok(());
        };
        if !enabled || !self.enabled {
            return Ok(());
        }

        let selected = selected.to_string();
        let source = Arc::clone(&self.source);
        let on_disconnect = Arc::new(on_disconnect);

        self.monitor.start(self.period, move |fence: PollFence| {
            let devices = source.list_devices();
            let selected = selected.clone();
            let on_disconnect = Arc::clone(&on_disconnect);
            async move {
                let devices = devices.await?;
                // A listing that resolves after unwatch or reselection is stale
                if !is_device_present(&devices, &selected) && fence.is_current() {
                    info!(device = %selected, "selected device disconnected");
                    on_disconnect();
                }
                Ok::<_, String>(CheckOutcome::Continue)
            }
        })
    }

    /// Stop watching.
    pub fn unwatch(&self) {
        self.monitor.stop();
    }

    pub fn is_watching(&self) -> bool {
        self.monitor.is_running()
    }
}
