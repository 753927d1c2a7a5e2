//! Demo: caching "expensive" weather lookups by city and coordinate.
//!
//! Run with: `cargo run --example weather_cache`

use cachebox::{CacheBox, CacheOptions, MemoryConnector, ParamSet, Result, StoreTarget};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // A remote connector would dial this; the memory backend only needs it
    // for show
    let target = StoreTarget::parse("cachebox://localhost/weather")?;
    println!("store target: {}:{}/{}", target.host, target.port, target.database);

    // One-hour expiry, geospatial matching within 1 km
    let cache = CacheBox::new(
        MemoryConnector::new(),
        CacheOptions::default()
            .time_to_expire_ms(60 * 60 * 1000)
            .geospatial(1000.0, "m")
            .build(),
    );

    let mut params = ParamSet::new();
    params.insert("kind", json!("forecast"));
    params.insert("lonlat", json!([-71.06, 42.36]));

    cache
        .deposit(params.clone(), json!({"temp_f": 54, "sky": "overcast"}))
        .await?;

    // Exact coordinate: hit
    println!("exact:  {:?}", cache.withdraw(&params).await?);

    // A few hundred meters away: still a hit
    let mut nearby = ParamSet::new();
    nearby.insert("kind", json!("forecast"));
    nearby.insert("lonlat", json!([-71.063, 42.361]));
    println!("nearby: {:?}", cache.withdraw(&nearby).await?);

    // Across the state: miss
    let mut distant = ParamSet::new();
    distant.insert("kind", json!("forecast"));
    distant.insert("lonlat", json!([-73.75, 42.65]));
    println!("distant: {:?}", cache.withdraw(&distant).await?);

    Ok(())
}
