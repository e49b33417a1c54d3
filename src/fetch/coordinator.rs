//! Last-reload-wins fetch state.
//!
//! Every `reload()` takes a new epoch. When the producer finishes, its result
//! is applied only if no newer reload was issued in the meantime and the
//! coordinator is still alive. Superseded attempts keep running to completion;
//! only their effect on state is dropped.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tracing::trace;

use crate::config::DEFAULT_ERROR_MESSAGE;

/// Observable state of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Result of the latest successful attempt, if any.
    pub data: Option<T>,
    /// True while the latest attempt has not finished.
    pub loading: bool,
    /// Message of the latest attempt, if it failed.
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    fn initial(loading: bool) -> Self {
        Self {
            data: None,
            loading,
            error: None,
        }
    }
}

/// Construction flags for [`FetchCoordinator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Clear `data` when a reload starts instead of keeping the stale value visible.
    pub reset_on_reload: bool,
    /// Whether `loading` starts out true before the first reload.
    pub initial_loading: bool,
}

type Producer<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

struct Core<T> {
    producer: Producer<T>,
    options: FetchOptions,
    state: watch::Sender<FetchState<T>>,
    epoch: AtomicU64,
    mounted: AtomicBool,
}

impl<T: Send + Sync + 'static> Core<T> {
    fn reload(self: &Arc<Self>) -> impl Future<Output = ()> + Send + 'static {
        let core = Arc::clone(self);
        let mut epoch = None;

        if self.mounted.load(Ordering::SeqCst) {
            let reset = self.options.reset_on_reload;
            self.state.send_modify(|state| {
                epoch = Some(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
                if reset {
                    state.data = None;
                }
                state.loading = true;
                state.error = None;
            });
        }

        // Invoked here rather than inside the returned future so producer
        // calls happen in issuance order.
        let pending = epoch.map(|epoch| (epoch, (self.producer)()));

        async move {
            let Some((epoch, pending)) = pending else {
                return;
            };

            let outcome = pending.await;
            let applied = core.state.send_if_modified(|state| {
                if !core.is_current(epoch) {
                    return false;
                }
                match outcome {
                    Ok(data) => {
                        state.data = Some(data);
                        state.error = None;
                    }
                    Err(message) => state.error = Some(message),
                }
                state.loading = false;
                true
            });

            if !applied {
                trace!(epoch, "discarded superseded fetch result");
            }
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == epoch
    }
}

/// Wraps an asynchronous producer and tracks its result as state.
pub struct FetchCoordinator<T> {
    core: Arc<Core<T>>,
}

impl<T: Send + Sync + 'static> FetchCoordinator<T> {
    pub fn new<F, Fut, E>(producer: F, options: FetchOptions) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + 'static,
    {
        let producer: Producer<T> = Arc::new(move || {
            producer()
                .map(|result| result.map_err(|e| failure_message(&e)))
                .boxed()
        });

        Self {
            core: Arc::new(Core {
                producer,
                options,
                state: watch::Sender::new(FetchState::initial(options.initial_loading)),
                epoch: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
        }
    }

    /// Start a new attempt.
    ///
    /// The attempt's epoch is taken, state is marked loading and the producer
    /// is invoked before this returns. The returned future applies the outcome
    /// and can be awaited or spawned; it is a no-op after teardown.
    pub fn reload(&self) -> impl Future<Output = ()> + Send + 'static {
        self.core.reload()
    }

    /// Cloneable trigger for deferring reloads into spawned tasks.
    pub fn reloader(&self) -> Reloader<T> {
        Reloader {
            core: Arc::clone(&self.core),
        }
    }

    /// Receiver notified on every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.core.state.subscribe()
    }

    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.core.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T>
    where
        T: Clone,
    {
        self.core.state.borrow().data.clone()
    }

    pub fn has_data(&self) -> bool {
        self.core.state.borrow().data.is_some()
    }

    pub fn loading(&self) -> bool {
        self.core.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.core.state.borrow().error.clone()
    }

    pub fn has_error(&self) -> bool {
        self.core.state.borrow().error.is_some()
    }

    /// Epoch of the most recently issued reload (0 before the first).
    pub fn epoch(&self) -> u64 {
        self.core.epoch.load(Ordering::SeqCst)
    }

    pub fn is_mounted(&self) -> bool {
        self.core.mounted.load(Ordering::SeqCst)
    }

    /// Detach from the consumer. In-flight attempts finish without touching state.
    pub fn teardown(&self) {
        self.core.mounted.store(false, Ordering::SeqCst);
    }
}

impl<T> Drop for FetchCoordinator<T> {
    fn drop(&mut self) {
        self.core.mounted.store(false, Ordering::SeqCst);
    }
}

/// Reload trigger sharing a coordinator's state.
///
/// Holding one does not keep the coordinator mounted.
pub struct Reloader<T> {
    core: Arc<Core<T>>,
}

impl<T> Clone for Reloader<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Send + Sync + 'static> Reloader<T> {
    pub fn reload(&self) -> impl Future<Output = ()> + Send + 'static {
        self.core.reload()
    }
}

fn failure_message(error: &dyn Display) -> String {
    let message = error.to_string();
    if message.is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
