//! Polls a backend job's progress until it reports an error.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::warn;

use super::interval::{CheckOutcome, IntervalMonitor, PollFence};
use crate::backend::ProgressReport;
use crate::config::{PollingConfig, PROGRESS_POLL_INTERVAL};
use crate::error::SyncResult;
use crate::traits::Scheduler;

type Fetch<P> = Arc<dyn Fn() -> BoxFuture<'static, Result<P, String>> + Send + Sync>;

/// What to poll and where to report it.
pub struct PollingOptions<P> {
    fetch: Fetch<P>,
    on_progress: Arc<dyn Fn(P) + Send + Sync>,
    on_error: Option<Arc<dyn Fn(String) + Send + Sync>>,
    interval: Duration,
}

impl<P: Send + 'static> PollingOptions<P> {
    pub fn new<F, Fut, E, C>(fetch: F, on_progress: C) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, E>> + Send + 'static,
        E: Display + 'static,
        C: Fn(P) + Send + Sync + 'static,
    {
        let fetch: Fetch<P> =
            Arc::new(move || fetch().map(|r| r.map_err(|e| e.to_string())).boxed());

        Self {
            fetch,
            on_progress: Arc::new(on_progress),
            on_error: None,
            interval: PROGRESS_POLL_INTERVAL,
        }
    }

    /// Called with the job's error message before polling stops.
    pub fn on_error<C>(mut self, on_error: C) -> Self
    where
        C: Fn(String) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Use the host's configured progress interval.
    pub fn with_config(self, config: &PollingConfig) -> Self {
        self.interval(config.progress_poll_interval())
    }
}

/// Progress poller for download and flash jobs.
///
/// Every snapshot goes to `on_progress`. A snapshot carrying an error is
/// terminal: `on_error` fires once and polling stops. A failed read is only
/// logged and retried on the next tick. Reads that complete after `stop()`
/// or a restart are dropped without reaching any callback.
pub struct ProgressMonitor {
    monitor: IntervalMonitor,
}

impl ProgressMonitor {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            monitor: IntervalMonitor::new("progress", scheduler),
        }
    }

    /// Start polling, replacing any poll already running.
    pub fn start<P>(&self, options: PollingOptions<P>) -> SyncResult<()>
    where
        P: ProgressReport + Send + 'static,
    {
        let PollingOptions {
            fetch,
            on_progress,
            on_error,
            interval,
        } = options;

        self.monitor.start(interval, move |fence: PollFence| {
            let pending = fetch();
            let on_progress = Arc::clone(&on_progress);
            let on_error = on_error.clone();
            async move {
                let progress = pending.await?;
                let Some(message) = progress.error().map(str::to_owned) else {
                    if fence.is_current() {
                        on_progress(progress);
                    }
                    return Ok(CheckOutcome::Continue);
                };

                // Overlapping ticks may all see the error; only the one that
                // ends the schedule reports it.
                if fence.finish() {
                    on_progress(progress);
                    warn!(error = %message, "backend job reported an error");
                    if let Some(on_error) = on_error {
                        on_error(message);
                    }
                }
                Ok::<_, String>(CheckOutcome::Stop)
            }
        })
    }

    pub fn stop(&self) {
        self.monitor.stop();
    }

    pub fn is_running(&self) -> bool {
        self.monitor.is_running()
    }
}
