use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::debug;

use super::coordinator::{FetchCoordinator, FetchOptions, FetchState};
use crate::traits::Scheduler;

/// Fetch gated by a boolean condition.
///
/// Reloads are only ever scheduled while the condition is true. Between the
/// condition opening and the first result arriving, `loading` reads true even
/// if the scheduled reload has not started yet.
pub struct ConditionalFetchDriver<T, K> {
    coordinator: FetchCoordinator<T>,
    scheduler: Arc<dyn Scheduler>,
    condition: bool,
    last: Option<(bool, K)>,
}

impl<T, K> ConditionalFetchDriver<T, K>
where
    T: Send + Sync + 'static,
    K: PartialEq,
{
    pub fn new<F, Fut, E>(producer: F, scheduler: Arc<dyn Scheduler>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + 'static,
    {
        Self {
            coordinator: FetchCoordinator::new(producer, FetchOptions::default()),
            scheduler,
            condition: false,
            last: None,
        }
    }

    /// Report the current condition and dependency key.
    ///
    /// When either differs from the previous sync and the condition is true,
    /// a reload is scheduled. Returns whether one was.
    pub fn sync(&mut self, condition: bool, key: K) -> bool {
        self.condition = condition;

        let current = (condition, key);
        if self.last.as_ref() == Some(&current) {
            return false;
        }
        self.last = Some(current);

        if !condition {
            return false;
        }

        debug!(epoch = self.coordinator.epoch(), "condition met, scheduling reload");
        let reloader = self.coordinator.reloader();
        self.scheduler.spawn(async move { reloader.reload().await }.boxed());
        true
    }

    /// Whether a result is still outstanding.
    pub fn loading(&self) -> bool {
        self.coordinator.loading()
            || (self.condition && !self.coordinator.has_data() && !self.coordinator.has_error())
    }

    /// Snapshot with the synthesized `loading` flag.
    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        FetchState {
            loading: self.loading(),
            ..self.coordinator.state()
        }
    }

    pub fn condition(&self) -> bool {
        self.condition
    }

    /// Reload now, regardless of the condition.
    pub fn reload(&self) -> impl Future<Output = ()> + Send + 'static {
        self.coordinator.reload()
    }

    /// Receiver of the underlying coordinator state (without the synthesized flag).
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.coordinator.subscribe()
    }

    pub fn coordinator(&self) -> &FetchCoordinator<T> {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ManualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog_driver(
        scheduler: &Arc<ManualScheduler>,
        calls: &Arc<AtomicUsize>,
        fail: bool,
    ) -> ConditionalFetchDriver<Vec<&'static str>, u32> {
        let calls = calls.clone();
        ConditionalFetchDriver::new(
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if fail {
                        Err("catalog unavailable".to_string())
                    } else {
                        Ok(vec!["orangepi5", "rock5b"])
                    }
                }
            },
            scheduler.clone(),
        )
    }

    #[tokio::test]
    async fn test_closed_condition_never_reloads() {
        let scheduler = Arc::new(ManualScheduler::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut driver = catalog_driver(&scheduler, &calls, false);

        assert!(!driver.sync(false, 1));
        assert!(!driver.sync(false, 2));
        assert!(!driver.sync(false, 3));
        scheduler.run_pending().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!driver.loading());
        assert_eq!(driver.state().data, None);
    }

    #[tokio::test]
    async fn test_loading_covers_gap_before_reload_starts() {
        let scheduler = Arc::new(ManualScheduler::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut driver = catalog_driver(&scheduler, &calls, false);

        assert!(driver.sync(true, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!driver.coordinator().loading());
        assert!(driver.loading());

        scheduler.run_pending().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            driver.state(),
            FetchState {
                data: Some(vec!["orangepi5", "rock5b"]),
                loading: false,
                error: None
            }
        );
    }

    #[tokio::test]
    async fn test_error_ends_synthesized_loading() {
        let scheduler = Arc::new(ManualScheduler::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut driver = catalog_driver(&scheduler, &calls, true);

        driver.sync(true, 1);
        scheduler.run_pending().await;

        assert!(!driver.loading());
        assert_eq!(driver.state().error.as_deref(), Some("catalog unavailable"));
    }

    #[tokio::test]
    async fn test_reloads_on_opening_and_key_change() {
        let scheduler = Arc::new(ManualScheduler::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut driver = catalog_driver(&scheduler, &calls, false);

        driver.sync(false, 1);
        driver.sync(true, 1);
        scheduler.run_pending().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Unchanged inputs do not reload
        assert!(!driver.sync(true, 1));
        assert!(driver.sync(true, 2));
        scheduler.run_pending().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Closing keeps the last data without reloading
        assert!(!driver.sync(false, 3));
        scheduler.run_pending().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(driver.state().data.is_some());
        assert!(!driver.condition());
    }
}
