use std::time::Duration;

use movi_common::MoviError;
use movi_config::schema::RoutingConfig;
use movi_routing::{OsrmClient, Stop};
use tracing::info;

/// Parse `lon,lat` arguments into stops, in the order given.
pub fn parse_stops(coords: &[String]) -> movi_common::Result<Vec<Stop>> {
    coords
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut stop: Stop = raw
                .parse()
                .map_err(|e: movi_routing::RoutingError| MoviError::Routing(e.to_string()))?;
            stop.name = format!("Stop {}", i + 1);
            Ok(stop)
        })
        .collect()
}

pub async fn run(config: &RoutingConfig, coords: &[String]) -> movi_common::Result<()> {
    let stops = parse_stops(coords)?;
    let client = OsrmClient::new(
        &config.osrm_url,
        config.profile.clone(),
        Duration::from_secs(config.timeout_secs.into()),
    )
    .map_err(|e| MoviError::Routing(e.to_string()))?;

    let geometry = client.fetch_geometry(&stops).await;
    info!(source = ?geometry.source, points = geometry.points.len(), "route geometry ready");

    let json = serde_json::to_string_pretty(&geometry)
        .map_err(|e| MoviError::Other(format!("failed to serialize geometry: {e}")))?;
    println!("{json}");
    Ok(())
}
