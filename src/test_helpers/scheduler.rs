use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::traits::{PollHandle, Scheduler, Tick};

/// Deterministic scheduler for tests.
///
/// Nothing runs until the test drives it: `run_pending()` completes every
/// spawned task and `advance()` fires each live timer exactly once. Tasks
/// run one after another, so overlapping ticks are exercised against
/// `TokioScheduler` with paused time instead.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    timers: Mutex<Vec<(PollHandle, Tick, Duration)>>,
    pending: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }

    pub fn periods(&self) -> Vec<Duration> {
        self.timers.lock().iter().map(|(_, _, period)| *period).collect()
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drive spawned tasks (and anything they spawn) to completion.
    pub async fn run_pending(&self) {
        loop {
            let batch = std::mem::take(&mut *self.pending.lock());
            if batch.is_empty() {
                break;
            }
            for task in batch {
                task.await;
            }
        }
    }

    /// Fire every live timer once, then run the resulting tasks.
    pub async fn advance(&self) {
        let ticks: Vec<Tick> = self
            .timers
            .lock()
            .iter()
            .map(|(_, tick, _)| tick.clone())
            .collect();
        for tick in ticks {
            self.pending.lock().push(tick());
        }
        self.run_pending().await;
    }
}

impl Scheduler for ManualScheduler {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.pending.lock().push(task);
    }

    fn schedule(&self, tick: Tick, period: Duration) -> PollHandle {
        let handle = PollHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.timers.lock().push((handle, tick, period));
        handle
    }

    fn cancel(&self, handle: PollHandle) {
        self.timers.lock().retain(|(h, _, _)| *h != handle);
    }
}
