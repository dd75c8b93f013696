//! Map command handlers for the CLI.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tenantdesk_core::{AppConfig, Coordinate, Location};
use tenantdesk_maps::{
    BootstrapPlatform, ContainerSlot, Credential, GeocodeResolver, GeocodingClient, Gesture,
    MapLoader, MapSession, ReadinessProbe,
};

const CONTAINER_ID: &str = "vendor-map";

fn maps_key(config: &AppConfig) -> anyhow::Result<&str> {
    config
        .maps_api_key
        .as_deref()
        .context("TENANTDESK_MAPS_API_KEY is not set")
}

fn resolver(config: &AppConfig, key: &str) -> anyhow::Result<GeocodeResolver> {
    let client = GeocodingClient::with_base_url(
        Credential::parse(key)?,
        config.request_timeout_secs,
        &config.user_agent,
        &config.maps_base_url,
    )?;
    Ok(GeocodeResolver::new(Arc::new(client)))
}

/// The location block as the form would store it, with the geocoded address
/// reported beside it rather than written into `vendor_address`.
pub(crate) fn picked_location(coordinate: Coordinate, address: &str) -> serde_json::Value {
    let mut location = Location::default();
    location.set_coordinate(coordinate);
    serde_json::json!({
        "location": location,
        "resolved_address": address,
    })
}

pub(crate) async fn run_geocode(config: &AppConfig, coordinate: Coordinate) -> anyhow::Result<()> {
    let resolver = resolver(config, maps_key(config)?)?;
    println!("{}", resolver.resolve(coordinate).await);
    Ok(())
}

/// Runs the picker flow headlessly: wait for the container, load the map
/// capability, drag the marker to `to`, and print the confirmed location.
/// The geocoded address is printed alongside; `vendor_address` stays empty
/// for the operator to fill in.
pub(crate) async fn run_pick(
    config: &AppConfig,
    from: Coordinate,
    to: Coordinate,
) -> anyhow::Result<()> {
    let key = maps_key(config)?;
    let platform = BootstrapPlatform::with_base_url(
        config.request_timeout_secs,
        &config.user_agent,
        &config.maps_base_url,
    )?;
    let loader = MapLoader::install_global(Arc::new(platform));
    let probe = ReadinessProbe::new(
        config.container_max_attempts,
        Duration::from_millis(config.container_interval_ms),
    );
    let container = ContainerSlot::mounted(CONTAINER_ID);

    let session = MapSession::open(
        &probe,
        &container,
        loader,
        key,
        from,
        resolver(config, key)?,
    )
    .await?;
    session.notify(|update| {
        let kind = if update.provisional {
            "provisional"
        } else {
            "resolved"
        };
        println!("[{kind}] {} -> {}", update.coordinate, update.address);
    });

    session.handle_gesture(Gesture::MarkerDragEnd(to)).await;
    let (coordinate, address) = session.confirm();

    println!(
        "{}",
        serde_json::to_string_pretty(&picked_location(coordinate, &address))?
    );
    Ok(())
}
