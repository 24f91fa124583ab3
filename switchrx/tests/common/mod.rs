#![allow(dead_code)]

use futures::{Stream, StreamExt};
use std::time::Duration;
use switchrx::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: String,
    pub country: String,
}

impl Zone {
    pub fn new(id: &str, country: &str) -> Self {
        Zone {
            id: id.to_string(),
            country: country.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchError {
    NetworkDown,
    Aborted,
}

/// A fake fetch that honours its token the way an abortable HTTP call would.
pub async fn fetch_zones(
    token: CancellationToken,
    delay: Duration,
    zones: Vec<Zone>,
) -> Result<Vec<Zone>, FetchError> {
    tokio::select! {
        _ = token.cancelled() => Err(FetchError::Aborted),
        _ = tokio::time::sleep(delay) => Ok(zones),
    }
}

pub async fn assert_silent<S>(stream: &mut S)
where
    S: Stream + Unpin,
    S::Item: std::fmt::Debug,
{
    let next = tokio::time::timeout(Duration::from_millis(30), stream.next()).await;
    assert!(next.is_err(), "unexpected item: {:?}", next);
}
