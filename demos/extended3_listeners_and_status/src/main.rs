use crate::tracing_setup::tracing_init;
use futures_signals::signal::SignalExt;
use std::time::Duration;
use switchrx::{unsubscribe_with_signal, Async, CancellationToken, RequestCoalescer};
use tokio::time::sleep;
use tracing::{error, info, warn};

mod tracing_setup;

#[derive(Debug, Clone)]
struct Consumption {
    yesterday: u64,
    last_30_days: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_init();

    info!("tokio: single-threaded runtime");
    info!("==========================================");
    warn!("A. Listeners and status drive the presentation");

    let disconnect = CancellationToken::new();
    let consumption = RequestCoalescer::<Consumption, String>::with_signal(disconnect.clone());

    let listeners = unsubscribe_with_signal(
        disconnect.clone(),
        vec![
            consumption.on_error(|e| error!("Worker | consumption error: {}", e)),
            consumption.on_value(|c| info!("Worker | consumption: {:?}", c)),
        ],
    );

    let pushed = consumption.push(|_| async {
        sleep(Duration::from_millis(100)).await;
        Ok(Consumption {
            yesterday: 12,
            last_30_days: 340,
        })
    });
    info!("  Main | push result: {:?}", pushed);

    consumption
        .status()
        .stop_if(|status| status.is_complete())
        .for_each(|status| async move {
            match status {
                Async::Uninitialized | Async::Loading(None) => info!("  Main | skeleton"),
                Async::Loading(Some(c)) => info!("  Main | refreshing {:?}", c),
                Async::Success { value } => info!(
                    "  Main | show {} kWh yesterday, {} kWh over 30 days",
                    value.yesterday, value.last_30_days
                ),
                Async::Fail { error, .. } => info!("  Main | show error {}", error),
            }
        })
        .await;

    info!("==========================================");
    warn!("B. A failed refresh keeps the previous value");

    let pushed = consumption.push(|_| async {
        sleep(Duration::from_millis(100)).await;
        Err("network-down".to_string())
    });
    info!("  Main | push result: {:?}", pushed);

    consumption
        .status()
        .stop_if(|status| status.is_fail())
        .for_each(|status| async move {
            info!("  Main | status: {:?}", status);
        })
        .await;

    disconnect.cancel();
    let _ = listeners.await;
    info!("  Main | disposed: {}", consumption.is_disposed());
    info!("  Main | Finish");
}
