use crate::unit_tests::{assert_silent, settle};
use crate::{unsubscribe_with_signal, Subject};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_emit_reaches_every_subscriber_in_order() {
    let subject = Subject::<u32>::new();
    let mut first = subject.subscribe();
    let mut second = subject.subscribe();

    assert_eq!(subject.emit(1), 2);
    assert_eq!(subject.emit(2), 2);

    assert_eq!(first.next().await, Some(1));
    assert_eq!(first.next().await, Some(2));
    assert_eq!(second.next().await, Some(1));
    assert_eq!(second.next().await, Some(2));
}

#[tokio::test]
async fn test_late_subscriber_misses_earlier_values() {
    let subject = Subject::<u32>::new();
    assert_eq!(subject.emit(1), 0);

    let mut late = subject.subscribe();
    subject.emit(2);

    assert_eq!(late.next().await, Some(2));
    assert_silent(&mut late).await;
}

#[tokio::test]
async fn test_unsubscribe_removes_only_that_subscriber() {
    let subject = Subject::<u32>::new();
    let first = subject.subscribe();
    let mut second = subject.subscribe();
    assert_eq!(subject.subscriber_count(), 2);

    first.unsubscribe();
    assert_eq!(subject.subscriber_count(), 1);
    assert_eq!(subject.emit(5), 1);
    assert_eq!(second.next().await, Some(5));
}

#[tokio::test]
async fn test_close_ends_subscriptions() {
    let subject = Subject::<u32>::new();
    let mut subscription = subject.subscribe();
    subject.emit(9);
    subject.close();

    assert!(subject.is_closed());
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(subject.emit(10), 0);
    assert_eq!(subscription.next().await, Some(9));
    assert_eq!(subscription.next().await, None);

    let mut after_close = subject.subscribe();
    assert_eq!(after_close.next().await, None);
}

#[tokio::test]
async fn test_cloned_subject_shares_subscribers() {
    let subject = Subject::<u32>::new();
    let clone = subject.clone();
    let mut subscription = subject.subscribe();

    assert_eq!(clone.subscriber_count(), 1);
    clone.emit(3);
    assert_eq!(subscription.next().await, Some(3));
}

#[tokio::test]
async fn test_listener_is_called_and_detaches_on_drop() {
    let subject = Subject::<u32>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = seen.clone();
    let listener = subject.listen(move |value| {
        seen_clone.lock().unwrap().push(value);
    });
    subject.emit(1);
    subject.emit(2);
    settle().await;
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

    drop(listener);
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(subject.emit(3), 0);
    settle().await;
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_listener_finishes_when_subject_closes() {
    let subject = Subject::<u32>::new();
    let listener = subject.listen(|_| {});

    subject.close();
    settle().await;

    assert!(listener.is_finished());
}

#[tokio::test]
async fn test_unsubscribe_with_signal() {
    let values = Subject::<u32>::new();
    let errors = Subject::<String>::new();
    let signal = CancellationToken::new();

    let handle = unsubscribe_with_signal(
        signal.clone(),
        vec![values.listen(|_| {}), errors.listen(|_| {})],
    );
    assert_eq!(values.subscriber_count(), 1);
    assert_eq!(errors.subscriber_count(), 1);

    signal.cancel();
    handle.await.unwrap();

    assert_eq!(values.subscriber_count(), 0);
    assert_eq!(errors.subscriber_count(), 0);
}
