use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use std::time::Duration;
use switchrx::{CancellationToken, RequestCoalescer};
use tokio::time::sleep;
use tracing::{debug, info, warn};

mod tracing_setup;

async fn fetch_price(token: CancellationToken) -> Result<u64, String> {
    tokio::select! {
        _ = token.cancelled() => {
            debug!("Worker | fetch aborted");
            Err("aborted".to_string())
        }
        _ = sleep(Duration::from_secs(5)) => Ok(42),
    }
}

#[tokio::main]
async fn main() {
    tracing_init();

    info!("==========================================");
    warn!("A. Disconnect signal cancels the in-flight fetch");

    let disconnect = CancellationToken::new();
    let prices = RequestCoalescer::<u64, String>::with_signal(disconnect.clone());
    let mut values = prices.subscribe_values();

    let pushed = prices.push(fetch_price);
    info!("  Main | push result: {:?}", pushed);

    let disconnect_clone = disconnect.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(200)).await;
        info!("Worker | component disconnected");
        disconnect_clone.cancel();
    });

    while let Some(price) = values.next().await {
        info!("  Main | price: {}", price);
    }
    info!("  Main | value stream ended, disposed: {}", prices.is_disposed());

    info!("==========================================");
    warn!("B. Push after teardown is rejected");

    match prices.push(fetch_price) {
        Ok(pushed) => warn!("  Main | unexpected push: {:?}", pushed),
        Err(error) => info!("  Main | push rejected: {}", error),
    }

    info!("  Main | Finish");
}
