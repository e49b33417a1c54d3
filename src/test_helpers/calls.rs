use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

type Response<T> = Result<T, String>;

/// Producer whose calls complete only when the test releases them.
///
/// Each `push()` queues the response slot for the next call, so completion
/// order is fully controlled by the order the returned senders are used.
pub struct PendingCalls<T> {
    responses: Arc<Mutex<VecDeque<oneshot::Receiver<Response<T>>>>>,
    count: Arc<AtomicUsize>,
}

impl<T: Send + 'static> PendingCalls<T> {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Prepare the response for the next producer call.
    pub fn push(&self) -> oneshot::Sender<Response<T>> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().push_back(rx);
        tx
    }

    /// Number of times the producer has been invoked.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn producer(&self) -> impl Fn() -> BoxFuture<'static, Response<T>> + Send + Sync + 'static {
        let responses = self.responses.clone();
        let count = self.count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            let next = responses.lock().pop_front();
            async move {
                match next {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err("response dropped".to_string())),
                    None => Err("no response queued".to_string()),
                }
            }
            .boxed()
        }
    }
}
