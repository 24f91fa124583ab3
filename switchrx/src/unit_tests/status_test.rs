use crate::mock::ManualOperation;
use crate::unit_tests::settle;
use crate::{Async, AsyncStreamExt, CoalescerConfig, RequestCoalescer};
use futures::StreamExt;
use futures_signals::signal::SignalExt;

// Test status of a successful operation
#[tokio::test]
async fn test_status_follows_success() {
    let coalescer = RequestCoalescer::<u32, String>::new();
    let _values = coalescer.subscribe_values();
    assert_eq!(coalescer.current_status(), Async::Uninitialized);

    coalescer.push(|_| async { Ok(5) }).unwrap();
    assert_eq!(coalescer.current_status(), Async::Loading(None));

    let statuses: Vec<_> = coalescer.status_stream().until_settled().collect().await;

    assert_eq!(statuses.first(), Some(&Async::Loading(None)));
    assert_eq!(statuses.last(), Some(&Async::success(5)));
}

// Test status of a failing operation retains the last value
#[tokio::test]
async fn test_status_fail_retains_value() {
    let coalescer = RequestCoalescer::<u32, String>::new();
    let mut values = coalescer.subscribe_values();
    let mut errors = coalescer.subscribe_errors();

    coalescer.push(|_| async { Ok(5) }).unwrap();
    assert_eq!(values.next().await, Some(5));

    coalescer
        .push(|_| async { Err("network-down".to_string()) })
        .unwrap();
    assert_eq!(coalescer.current_status(), Async::Loading(Some(5)));

    assert_eq!(errors.next().await, Some("network-down".to_string()));
    assert_eq!(
        coalescer.current_status(),
        Async::fail("network-down".to_string(), Some(5))
    );
}

// Test status without value retention
#[tokio::test]
async fn test_status_without_retain() {
    let config = CoalescerConfig::default().with_retain_value(false);
    let coalescer = RequestCoalescer::<u32, String>::from_config(config, None);
    let mut values = coalescer.subscribe_values();
    let mut errors = coalescer.subscribe_errors();

    coalescer.push(|_| async { Ok(5) }).unwrap();
    assert_eq!(values.next().await, Some(5));

    coalescer
        .push(|_| async { Err("network-down".to_string()) })
        .unwrap();
    assert_eq!(coalescer.current_status(), Async::Loading(None));

    errors.next().await;
    assert_eq!(
        coalescer.current_status(),
        Async::fail("network-down".to_string(), None)
    );
}

// Test that a superseded outcome never reaches the status
#[tokio::test]
async fn test_superseded_outcome_does_not_touch_status() {
    let coalescer = RequestCoalescer::<u32, String>::new();
    let _values = coalescer.subscribe_values();

    let stale = ManualOperation::new();
    coalescer.push(stale.factory()).unwrap();
    let fresh = ManualOperation::new();
    coalescer.push(fresh.factory()).unwrap();

    stale.resolve(7);
    settle().await;
    assert_eq!(coalescer.current_status(), Async::Loading(None));

    fresh.resolve(8);
    let settled = coalescer
        .status()
        .stop_if(|status| status.is_complete())
        .to_stream()
        .collect::<Vec<_>>()
        .await;
    assert_eq!(settled.last(), Some(&Async::success(8)));
}

// Test that an unobserved push leaves the status alone
#[tokio::test]
async fn test_unobserved_push_keeps_status() {
    let coalescer = RequestCoalescer::<u32, String>::new();
    let status_stream = coalescer.status_stream();

    coalescer.push(|_| async { Ok(1) }).unwrap();

    assert_eq!(coalescer.current_status(), Async::Uninitialized);
    drop(status_stream);
}
