use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use std::time::Duration;
use switchrx::{CancelPolicy, CancellationToken, CoalescerConfig, RequestCoalescer};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

mod tracing_setup;

async fn search(query: String, token: CancellationToken) -> Result<Vec<String>, String> {
    debug!("Worker | start search: {}", query);
    for _ in 0..10 {
        if token.is_cancelled() {
            debug!("Worker | search cancelled: {}", query);
            return Err(format!("search for {} cancelled", query));
        }
        sleep(Duration::from_millis(20)).await;
    }
    debug!("Worker | finish search: {}", query);
    Ok(vec![format!("{}-node", query), format!("{}-php", query)])
}

async fn type_ahead(coalescer: &RequestCoalescer<Vec<String>, String>) {
    let mut values = coalescer.subscribe_values();
    let mut errors = coalescer.subscribe_errors();

    for query in ["c", "cl", "cle", "clev"] {
        info!("  Main | typed: {}", query);
        let pushed = coalescer.push(move |token| search(query.to_string(), token));
        info!("  Main | push result: {:?}", pushed);
        sleep(Duration::from_millis(50)).await;
    }

    if let Some(results) = values.next().await {
        info!("  Main | results: {:?}", results);
    }
    match timeout(Duration::from_millis(300), errors.next()).await {
        Ok(error) => warn!("  Main | unexpected error: {:?}", error),
        Err(_) => info!("  Main | cancelled searches never reached the error stream"),
    }
}

#[tokio::main]
async fn main() {
    tracing_init();

    info!("==========================================");
    warn!("A. Cooperative cancellation, only the last search is delivered");
    let coalescer = RequestCoalescer::new();
    type_ahead(&coalescer).await;

    info!("==========================================");
    warn!("B. Abort policy drops superseded searches");
    let config = CoalescerConfig::default().with_cancel_policy(CancelPolicy::Abort);
    let coalescer = RequestCoalescer::from_config(config, None);
    type_ahead(&coalescer).await;

    info!("  Main | Finish");
}
