use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use std::time::Duration;
use switchrx::{Pushed, RequestCoalescer};
use tokio::time::sleep;
use tracing::{info, warn};

mod tracing_setup;

#[derive(Debug, Clone)]
struct Zone {
    id: &'static str,
    city: &'static str,
}

async fn fetch_all_zones() -> Result<Vec<Zone>, String> {
    sleep(Duration::from_millis(100)).await;
    Ok(vec![
        Zone { id: "par", city: "Paris" },
        Zone { id: "rbx", city: "Roubaix" },
        Zone { id: "mtl", city: "Montreal" },
    ])
}

#[tokio::main]
async fn main() {
    tracing_init();

    info!("==========================================");
    warn!("A. Push without subscribers is dropped");

    let zones = RequestCoalescer::<Vec<Zone>, String>::new();
    let pushed = zones.push(|_| fetch_all_zones());
    info!("  Main | push result: {:?}", pushed);
    assert_eq!(pushed, Ok(Pushed::Unobserved));

    info!("==========================================");
    warn!("B. Push with a value subscriber");

    let mut values = zones.subscribe_values();
    let pushed = zones.push(|_| fetch_all_zones());
    info!("  Main | push result: {:?}", pushed);

    if let Some(zones) = values.next().await {
        for zone in zones {
            info!("  Main | zone {} in {}", zone.id, zone.city);
        }
    }

    info!("==========================================");
    warn!("C. Failures go to the error stream");

    let mut errors = zones.subscribe_errors();
    let pushed = zones.push(|_| async {
        sleep(Duration::from_millis(50)).await;
        Err::<Vec<Zone>, _>("network-down".to_string())
    });
    info!("  Main | push result: {:?}", pushed);
    if let Some(error) = errors.next().await {
        info!("  Main | error: {}", error);
    }

    info!("  Main | Finish");
}
