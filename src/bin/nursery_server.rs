//! Nursery Finder server
//!
//! Configuration comes from the YAML file named by `NURSERY_CONFIG` (defaults
//! otherwise); `NURSERY_BIND` overrides the listen address. Log levels follow
//! `RUST_LOG`.

use nursery::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "nursery=info,nursery_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let facilities = match &config.seed_file {
        Some(path) => seed::from_yaml_file(path)?,
        None => seed::demo_facilities()?,
    };
    tracing::info!(
        facilities = facilities.len(),
        bind = %config.server.bind,
        "Starting nursery server"
    );

    ServerBuilder::new()
        .with_config(config)
        .with_facility_service(InMemoryFacilityService::with_facilities(facilities))
        .serve()
        .await
}
