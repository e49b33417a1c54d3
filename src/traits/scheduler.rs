//! Timer and task scheduling capability.
//!
//! Monitors and fetch wrappers never touch the runtime directly; they go
//! through [`Scheduler`], so tests can swap in a deterministic fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::SyncResult;

/// Opaque identifier of a recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle(u64);

impl PollHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Work fired on every period of a schedule.
pub type Tick = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Spawns one-shot tasks and runs recurring ones.
pub trait Scheduler: Send + Sync {
    /// Run a task to completion in the background.
    fn spawn(&self, task: BoxFuture<'static, ()>);

    /// Fire `tick` every `period`, first one period from now.
    ///
    /// Each firing runs as its own task, so a slow tick never holds up the
    /// next one.
    fn schedule(&self, tick: Tick, period: Duration) -> PollHandle;

    /// Stop a schedule. Unknown or already cancelled handles are ignored.
    fn cancel(&self, handle: PollHandle);
}

/// Real implementation backed by a Tokio runtime.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    timers: Mutex<HashMap<PollHandle, JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Bind to the runtime of the calling context.
    pub fn current() -> SyncResult<Self> {
        Ok(Self::with_handle(Handle::try_current()?))
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(0),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Number of schedules not yet cancelled.
    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.runtime.spawn(task);
    }

    fn schedule(&self, tick: Tick, period: Duration) -> PollHandle {
        let handle = PollHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let runtime = self.runtime.clone();

        let task = self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                runtime.spawn(tick());
            }
        });

        self.timers.lock().insert(handle, task);
        handle
    }

    fn cancel(&self, handle: PollHandle) {
        if let Some(task) = self.timers.lock().remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.timers.lock().drain() {
            task.abort();
        }
    }
}
