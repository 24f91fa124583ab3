use crate::{Async, CancelPolicy, CoalescerConfig, CoalescerError, Listener, Subject, Subscription};
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of an accepted [`RequestCoalescer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    /// The factory was invoked; its operation carries this generation.
    Started(u64),
    /// Nobody subscribes to values or errors, so the factory was not invoked.
    Unobserved,
}

impl Pushed {
    pub fn is_started(&self) -> bool {
        matches!(self, Pushed::Started(_))
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            Pushed::Started(generation) => Some(*generation),
            Pushed::Unobserved => None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    active: Option<CancellationToken>,
    disposed: bool,
}

struct Inner<T, E> {
    config: CoalescerConfig,
    scope: CancellationToken,
    slot: Mutex<Slot>,
    values: Subject<T>,
    errors: Subject<E>,
    status: Mutable<Async<T, E>>,
}

impl<T, E> Inner<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().expect("coalescer state poisoned")
    }

    fn is_observed(&self) -> bool {
        self.values.subscriber_count() > 0 || self.errors.subscriber_count() > 0
    }

    fn settle(&self, generation: u64, outcome: Result<T, E>) {
        let mut slot = self.lock_slot();
        if slot.disposed || self.scope.is_cancelled() {
            debug!(generation, "discarding outcome after dispose");
            return;
        }
        if slot.generation != generation {
            debug!(generation, current = slot.generation, "discarding superseded outcome");
            return;
        }
        if let Some(token) = slot.active.take() {
            token.cancel();
        }

        let retain = self.config.retain_value;
        let status = Async::settled(outcome.clone(), &*self.status.lock_ref(), retain);
        self.status.set(status);
        match outcome {
            Ok(value) => {
                debug!(generation, "operation succeeded");
                self.values.emit(value);
            }
            Err(error) => {
                debug!(generation, "operation failed");
                self.errors.emit(error);
            }
        }
    }

    fn dispose(&self) {
        let mut slot = self.lock_slot();
        if slot.disposed {
            return;
        }
        slot.disposed = true;
        if let Some(active) = slot.active.take() {
            active.cancel();
        }
        self.scope.cancel();
        self.values.close();
        self.errors.close();
        debug!(generation = slot.generation, "coalescer disposed");
    }
}

// Rolls back a push whose factory unwinds. Disarmed by taking `previous`.
struct StartGuard<'a, T, E> {
    inner: &'a Inner<T, E>,
    generation: u64,
    previous: Option<Async<T, E>>,
}

impl<T, E> Drop for StartGuard<'_, T, E> {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let Ok(mut slot) = self.inner.slot.lock() else {
            return;
        };
        if slot.generation == self.generation {
            if let Some(token) = slot.active.take() {
                token.cancel();
            }
            self.inner.status.set(previous);
        }
    }
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Turns a sequence of cancellable async operations into a stream of values
/// and a stream of errors, delivering only the outcome of the latest one.
///
/// Each [`push`](Self::push) cancels the token of the previous operation
/// before invoking the new factory. Outcomes of superseded operations are
/// discarded. The coalescer is disposed by [`dispose`](Self::dispose), by
/// its teardown signal, or by being dropped.
///
/// `push` and `with_signal` spawn tokio tasks, so they must be called from
/// within a tokio runtime.
///
/// ## Examples
///
/// ```
/// use futures::StreamExt;
/// use switchrx::RequestCoalescer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let zones = RequestCoalescer::<Vec<&str>, String>::new();
/// let mut values = zones.subscribe_values();
///
/// zones.push(|_token| async { Ok(vec!["par", "rbx"]) }).unwrap();
///
/// assert_eq!(values.next().await, Some(vec!["par", "rbx"]));
/// # }
/// ```
pub struct RequestCoalescer<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> RequestCoalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::from_config(CoalescerConfig::default(), None)
    }

    /// Creates a coalescer that disposes itself once `signal` fires.
    pub fn with_signal(signal: CancellationToken) -> Self {
        Self::from_config(CoalescerConfig::default(), Some(signal))
    }

    pub fn from_config(config: CoalescerConfig, signal: Option<CancellationToken>) -> Self {
        let scope = match &signal {
            Some(signal) => signal.child_token(),
            None => CancellationToken::new(),
        };
        let inner = Arc::new(Inner {
            config,
            scope,
            slot: Mutex::new(Slot::default()),
            values: Subject::new(),
            errors: Subject::new(),
            status: Mutable::new(Async::Uninitialized),
        });

        if signal.is_some() {
            let scope = inner.scope.clone();
            let weak = Arc::downgrade(&inner);
            tokio::spawn(async move {
                scope.cancelled().await;
                if let Some(inner) = weak.upgrade() {
                    inner.dispose();
                }
            });
        }

        RequestCoalescer { inner }
    }

    /// Starts the operation built by `factory`, superseding the active one.
    ///
    /// The token handed to `factory` is a child of the coalescer's scope. It
    /// is cancelled when the operation settles, when a later push supersedes
    /// it, or when the coalescer is disposed.
    ///
    /// Under [`CancelPolicy::Cooperative`] a superseded future is still polled
    /// to completion, but every future is dropped once the coalescer is
    /// disposed. If `factory` panics, the push is rolled back before the
    /// panic propagates.
    ///
    /// Returns [`Pushed::Unobserved`] without invoking `factory` when neither
    /// output has a subscriber, and [`CoalescerError::Disposed`] once the
    /// coalescer is disposed.
    pub fn push<F, Fut>(&self, factory: F) -> Result<Pushed, CoalescerError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let inner = &self.inner;
        let (generation, token, previous) = {
            let mut slot = inner.lock_slot();
            if slot.disposed || inner.scope.is_cancelled() {
                return Err(CoalescerError::Disposed);
            }
            if !inner.is_observed() {
                warn!("push dropped: no value or error subscribers");
                return Ok(Pushed::Unobserved);
            }
            if let Some(previous) = slot.active.take() {
                debug!(generation = slot.generation, "cancelling superseded operation");
                previous.cancel();
            }
            slot.generation += 1;
            let token = inner.scope.child_token();
            slot.active = Some(token.clone());

            let retain = inner.config.retain_value;
            let previous = inner.status.get_cloned();
            inner.status.set(Async::reloading(&previous, retain));
            (slot.generation, token, previous)
        };

        debug!(generation, "starting operation");
        let mut guard = StartGuard {
            inner,
            generation,
            previous: Some(previous),
        };
        let operation = factory(token.clone());
        guard.previous.take();

        let weak = Arc::downgrade(&self.inner);
        let scope = inner.scope.clone();
        let policy = inner.config.cancel_policy;
        tokio::spawn(async move {
            let outcome = match policy {
                CancelPolicy::Cooperative => tokio::select! {
                    biased;
                    _ = scope.cancelled() => None,
                    outcome = operation => Some(outcome),
                },
                CancelPolicy::Abort => tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    outcome = operation => Some(outcome),
                },
            };
            let Some(outcome) = outcome else {
                debug!(generation, "operation dropped");
                return;
            };
            if let Some(inner) = weak.upgrade() {
                inner.settle(generation, outcome);
            }
        });

        Ok(Pushed::Started(generation))
    }

    pub fn subscribe_values(&self) -> Subscription<T> {
        self.inner.values.subscribe()
    }

    pub fn subscribe_errors(&self) -> Subscription<E> {
        self.inner.errors.subscribe()
    }

    pub fn on_value<F>(&self, listener: F) -> Listener
    where
        F: FnMut(T) + Send + 'static,
    {
        self.inner.values.listen(listener)
    }

    pub fn on_error<F>(&self, listener: F) -> Listener
    where
        F: FnMut(E) + Send + 'static,
    {
        self.inner.errors.listen(listener)
    }

    /// Status of the latest started operation. Status observers do not count
    /// as subscribers for `push`.
    pub fn status(&self) -> MutableSignalCloned<Async<T, E>> {
        self.inner.status.signal_cloned()
    }

    pub fn status_stream(&self) -> SignalStream<MutableSignalCloned<Async<T, E>>> {
        self.inner.status.signal_cloned().to_stream()
    }

    pub fn current_status(&self) -> Async<T, E> {
        self.inner.status.get_cloned()
    }

    /// Cancels the active operation, ends every subscription and rejects
    /// further pushes. Calling it again has no effect.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock_slot().disposed || self.inner.scope.is_cancelled()
    }

    /// True while a started operation has neither settled nor been superseded.
    pub fn is_active(&self) -> bool {
        self.inner.lock_slot().active.is_some()
    }

    /// Generation of the most recently started operation, 0 before the first.
    pub fn generation(&self) -> u64 {
        self.inner.lock_slot().generation
    }

    /// Number of value and error subscribers combined.
    pub fn subscriber_count(&self) -> usize {
        self.inner.values.subscriber_count() + self.inner.errors.subscriber_count()
    }

    pub fn config(&self) -> &CoalescerConfig {
        &self.inner.config
    }
}

impl<T, E> Default for RequestCoalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
