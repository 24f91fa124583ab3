//! Test helpers for code that pushes operations into a coalescer.

use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Boxed future returned by [`ManualOperation::factory`].
pub type OperationFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// An operation settled by hand.
///
/// The factory from [`factory`](Self::factory) records its invocation and the
/// token it received. Its future stays pending until [`resolve`](Self::resolve)
/// or [`reject`](Self::reject) is called, or forever if neither is.
pub struct ManualOperation<T, E> {
    calls: Arc<AtomicUsize>,
    token: Arc<Mutex<Option<CancellationToken>>>,
    sender: Mutex<Option<oneshot::Sender<Result<T, E>>>>,
    receiver: Arc<Mutex<Option<oneshot::Receiver<Result<T, E>>>>>,
}

impl<T: Send + 'static, E: Send + 'static> Default for ManualOperation<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static, E: Send + 'static> ManualOperation<T, E> {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        ManualOperation {
            calls: Arc::new(AtomicUsize::new(0)),
            token: Arc::new(Mutex::new(None)),
            sender: Mutex::new(Some(tx)),
            receiver: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Returns a factory to pass to `push`.
    pub fn factory(&self) -> impl FnOnce(CancellationToken) -> OperationFuture<T, E> + Send + 'static {
        let calls = self.calls.clone();
        let token_slot = self.token.clone();
        let receiver_slot = self.receiver.clone();
        move |token: CancellationToken| -> OperationFuture<T, E> {
            calls.fetch_add(1, Ordering::SeqCst);
            *token_slot.lock().unwrap() = Some(token);
            let receiver = receiver_slot.lock().unwrap().take();
            Box::pin(async move {
                match receiver {
                    Some(receiver) => match receiver.await {
                        Ok(outcome) => outcome,
                        Err(_) => pending().await,
                    },
                    None => pending().await,
                }
            })
        }
    }

    /// Settles the operation with a value. Returns false if it was already
    /// settled or its future was dropped.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settles the operation with an error. Returns false if it was already
    /// settled or its future was dropped.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    fn settle(&self, outcome: Result<T, E>) -> bool {
        match self.sender.lock().unwrap().take() {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }

    /// How many times the factory was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The token handed to the factory, once it was invoked.
    pub fn token(&self) -> Option<CancellationToken> {
        self.token.lock().unwrap().clone()
    }

    pub fn was_cancelled(&self) -> bool {
        self.token().is_some_and(|token| token.is_cancelled())
    }
}
