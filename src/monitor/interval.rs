//! Recurring check scheduler.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::traits::{PollHandle, Scheduler, Tick};

/// What a check wants to happen to its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Keep polling.
    Continue,
    /// Terminal condition reached; cancel the schedule that ran this check.
    Stop,
}

#[derive(Default)]
struct PollSlot {
    handle: Option<PollHandle>,
    /// Bumped on every start and stop so checks from an older schedule
    /// can tell they no longer speak for the monitor.
    generation: u64,
}

/// Ties a running check to the schedule that issued it.
///
/// Ticks of one schedule may overlap, and a check may still be awaiting its
/// backend call when the monitor is stopped or restarted. Checks consult the
/// fence before reporting to callers.
#[derive(Clone)]
pub struct PollFence {
    name: &'static str,
    slot: Weak<Mutex<PollSlot>>,
    scheduler: Weak<dyn Scheduler>,
    generation: u64,
}

impl PollFence {
    /// Whether the issuing schedule is still the live one.
    pub fn is_current(&self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let current = slot.lock().generation == self.generation;
        current
    }

    /// End the issuing schedule.
    ///
    /// Returns true for exactly one caller while the schedule is live, false
    /// once it was stopped, replaced or already finished.
    pub fn finish(&self) -> bool {
        let (Some(slot), Some(scheduler)) = (self.slot.upgrade(), self.scheduler.upgrade()) else {
            return false;
        };

        let mut slot = slot.lock();
        if slot.generation != self.generation {
            return false;
        }
        slot.generation += 1;
        if let Some(handle) = slot.handle.take() {
            scheduler.cancel(handle);
        }
        debug!(monitor = self.name, "poll reached terminal condition");
        true
    }
}

/// Runs a check immediately and then on a fixed period until stopped.
///
/// Check failures are logged and swallowed; only `stop()` or a check
/// returning [`CheckOutcome::Stop`] ends the schedule. Dropping the monitor
/// stops it.
pub struct IntervalMonitor {
    name: &'static str,
    scheduler: Arc<dyn Scheduler>,
    slot: Arc<Mutex<PollSlot>>,
}

impl IntervalMonitor {
    pub fn new(name: &'static str, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            name,
            scheduler,
            slot: Arc::new(Mutex::new(PollSlot::default())),
        }
    }

    /// Start polling, replacing any schedule that is already running.
    ///
    /// Every invocation of `check` receives the [`PollFence`] of this start.
    pub fn start<F, Fut, E>(&self, period: Duration, check: F) -> SyncResult<()>
    where
        F: Fn(PollFence) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CheckOutcome, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if period.is_zero() {
            return Err(SyncError::InvalidPeriod { monitor: self.name });
        }

        let tick = {
            let mut slot = self.slot.lock();
            if let Some(previous) = slot.handle.take() {
                debug!(monitor = self.name, "replacing running poll");
                self.scheduler.cancel(previous);
            }
            slot.generation += 1;

            let tick = self.tick(check, slot.generation);
            slot.handle = Some(self.scheduler.schedule(tick.clone(), period));
            tick
        };
        self.scheduler.spawn(tick());

        debug!(monitor = self.name, ?period, "poll started");
        Ok(())
    }

    /// Cancel the running schedule, if any.
    ///
    /// Checks still in flight see their fence go stale immediately.
    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(handle) = slot.handle.take() {
            self.scheduler.cancel(handle);
            debug!(monitor = self.name, "poll stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.lock().handle.is_some()
    }

    fn tick<F, Fut, E>(&self, check: F, generation: u64) -> Tick
    where
        F: Fn(PollFence) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CheckOutcome, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let fence = PollFence {
            name: self.name,
            slot: Arc::downgrade(&self.slot),
            scheduler: Arc::downgrade(&self.scheduler),
            generation,
        };

        Arc::new(move || {
            let fence = fence.clone();
            let pending = check(fence.clone());
            async move {
                match pending.await {
                    Ok(CheckOutcome::Continue) => {}
                    Ok(CheckOutcome::Stop) => {
                        fence.finish();
                    }
                    Err(e) => warn!(monitor = fence.name, error = %e, "check failed, will retry"),
                }
            }
            .boxed()
        })
    }
}

impl Drop for IntervalMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
