use futures_core::stream::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

// `None` once the subject is closed.
type Senders<T> = Option<HashMap<u64, UnboundedSender<T>>>;

struct Registry<T> {
    next_id: AtomicU64,
    senders: Mutex<Senders<T>>,
}

impl<T> Registry<T> {
    fn lock(&self) -> MutexGuard<'_, Senders<T>> {
        self.senders.lock().expect("subject registry poisoned")
    }

    fn remove(&self, id: u64) {
        if let Some(senders) = self.lock().as_mut() {
            senders.remove(&id);
        }
    }
}

/// A multicast output. Every subscription receives every value emitted after
/// it subscribed, in emission order.
pub struct Subject<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Subject {
            registry: self.registry.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Subject {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                senders: Mutex::new(Some(HashMap::new())),
            }),
        }
    }

    /// Subscribes to future emissions. On a closed subject the returned
    /// subscription ends immediately.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Some(senders) = self.registry.lock().as_mut() {
            senders.insert(id, tx);
        }
        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls `listener` with every emitted value from a spawned task.
    pub fn listen<F>(&self, listener: F) -> Listener
    where
        F: FnMut(T) + Send + 'static,
    {
        Listener::spawn(self.subscribe(), listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .as_ref()
            .map_or(0, |senders| senders.values().filter(|tx| !tx.is_closed()).count())
    }

    /// Sends `value` to every live subscription and returns how many received
    /// it. Subscriptions whose receiver is gone are pruned.
    pub fn emit(&self, value: T) -> usize {
        let mut guard = self.registry.lock();
        let Some(senders) = guard.as_mut() else {
            return 0;
        };
        senders.retain(|_, tx| tx.send(value.clone()).is_ok());
        trace!(delivered = senders.len(), "emitted");
        senders.len()
    }

    /// Drops every sender. Subscriptions drain what they already received and
    /// then end.
    pub fn close(&self) {
        self.registry.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.registry.lock().is_none()
    }
}

/// A stream of values from a [`Subject`]. Dropping it unsubscribes.
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct Subscription<T> {
    id: u64,
    receiver: UnboundedReceiver<T>,
    registry: Weak<Registry<T>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {}

    fn detach_fn(&self) -> impl FnOnce() + Send + 'static
    where
        T: Send + 'static,
    {
        let registry = self.registry.clone();
        let id = self.id;
        move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

/// A callback subscription. The callback runs on a spawned task; dropping the
/// listener detaches it from its subject immediately and stops the task.
#[must_use = "Listeners detach when dropped"]
pub struct Listener {
    detach: Option<Box<dyn FnOnce() + Send>>,
    task: JoinHandle<()>,
}

impl Listener {
    pub(crate) fn spawn<T, F>(mut subscription: Subscription<T>, mut listener: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let detach: Box<dyn FnOnce() + Send> = Box::new(subscription.detach_fn());
        let task = tokio::spawn(async move {
            while let Some(value) = subscription.receiver.recv().await {
                listener(value);
            }
        });
        Listener {
            detach: Some(detach),
            task,
        }
    }

    pub fn unsubscribe(self) {}

    /// True once the subject closed and every received value was handled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
        self.task.abort();
    }
}

/// Drops every listener once `signal` fires.
pub fn unsubscribe_with_signal<I>(signal: CancellationToken, listeners: I) -> JoinHandle<()>
where
    I: IntoIterator<Item = Listener>,
{
    let listeners: Vec<Listener> = listeners.into_iter().collect();
    tokio::spawn(async move {
        signal.cancelled().await;
        trace!(count = listeners.len(), "unsubscribing listeners");
        drop(listeners);
    })
}
