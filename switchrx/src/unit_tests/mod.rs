use futures::{Stream, StreamExt};
use std::time::Duration;

mod status_test;
mod stream_ext_test;
mod subject_test;

pub type Zones = Vec<String>;

pub fn zones(names: &[&str]) -> Zones {
    names.iter().map(|name| name.to_string()).collect()
}

/// Lets spawned operation tasks run on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Asserts that `stream` yields nothing within a short window.
pub async fn assert_silent<S>(stream: &mut S)
where
    S: Stream + Unpin,
    S::Item: std::fmt::Debug,
{
    let next = tokio::time::timeout(Duration::from_millis(30), stream.next()).await;
    assert!(next.is_err(), "unexpected item: {:?}", next);
}
