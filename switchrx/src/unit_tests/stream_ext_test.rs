use crate::{Async, AsyncStreamExt};
use futures::stream::{self, StreamExt};

#[tokio::test]
async fn test_until_settled_stops_after_success() {
    let statuses = stream::iter(vec![
        Async::<u32, String>::Uninitialized,
        Async::Loading(None),
        Async::success(1),
        Async::Loading(Some(1)),
        Async::success(2),
    ]);

    let seen: Vec<_> = statuses.until_settled().collect().await;

    assert_eq!(
        seen,
        vec![Async::Uninitialized, Async::Loading(None), Async::success(1)]
    );
}

#[tokio::test]
async fn test_until_settled_stops_after_fail() {
    let statuses = stream::iter(vec![
        Async::<u32, String>::Loading(Some(3)),
        Async::fail("network-down".to_string(), Some(3)),
        Async::success(4),
    ]);

    let seen: Vec<_> = statuses.until_settled().collect().await;

    assert_eq!(seen.len(), 2);
    assert!(seen[1].is_fail());
}

#[tokio::test]
async fn test_until_settled_ends_with_inner_stream() {
    let statuses = stream::iter(vec![
        Async::<u32, String>::Uninitialized,
        Async::Loading(None),
    ]);

    let mut settled = statuses.until_settled();
    assert_eq!(settled.next().await, Some(Async::Uninitialized));
    assert_eq!(settled.next().await, Some(Async::Loading(None)));
    assert_eq!(settled.next().await, None);
    assert_eq!(settled.next().await, None);
}
