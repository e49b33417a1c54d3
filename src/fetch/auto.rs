use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::debug;

use super::coordinator::{FetchCoordinator, FetchOptions, FetchState};
use crate::traits::Scheduler;

/// Options for [`AutoFetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoFetchOptions {
    /// Reload automatically on the first sync and on every key change.
    pub immediate: bool,
    /// Clear data before each reload.
    pub reset_on_reload: bool,
}

impl Default for AutoFetchOptions {
    fn default() -> Self {
        Self {
            immediate: true,
            reset_on_reload: false,
        }
    }
}

/// Fetch that reloads whenever its dependency key changes.
///
/// The consumer calls [`AutoFetch::sync`] with the current key each time it
/// re-evaluates (on mount and after every update). Keys are compared with
/// `PartialEq`, so tuples and vectors compare element by element.
pub struct AutoFetch<T, K> {
    coordinator: FetchCoordinator<T>,
    scheduler: Arc<dyn Scheduler>,
    immediate: bool,
    key: Option<K>,
}

impl<T, K> AutoFetch<T, K>
where
    T: Send + Sync + 'static,
    K: PartialEq,
{
    pub fn new<F, Fut, E>(
        producer: F,
        options: AutoFetchOptions,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + 'static,
    {
        let coordinator = FetchCoordinator::new(
            producer,
            FetchOptions {
                reset_on_reload: options.reset_on_reload,
                initial_loading: options.immediate,
            },
        );

        Self {
            coordinator,
            scheduler,
            immediate: options.immediate,
            key: None,
        }
    }

    /// Report the current dependency key.
    ///
    /// Schedules a reload on the first call and whenever the key differs from
    /// the previous one, unless automatic reloading is off. Returns whether a
    /// reload was scheduled.
    pub fn sync(&mut self, key: K) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.key = Some(key);

        if !self.immediate {
            return false;
        }

        debug!(epoch = self.coordinator.epoch(), "dependency changed, scheduling reload");
        let reloader = self.coordinator.reloader();
        self.scheduler.spawn(async move { reloader.reload().await }.boxed());
        true
    }

    /// Reload now, regardless of the key.
    pub fn reload(&self) -> impl Future<Output = ()> + Send + 'static {
        self.coordinator.reload()
    }

    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.coordinator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.coordinator.subscribe()
    }

    pub fn coordinator(&self) -> &FetchCoordinator<T> {
        &self.coordinator
    }
}
