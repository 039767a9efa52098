//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::defaults::{
    DEFAULT_PICKUP_CITY, DEFAULT_PICKUP_NAME, DEFAULT_PICKUP_POSTCODE, DEFAULT_PICKUP_STREET,
};
use crate::services::import_processor::ImportDefaults;
use crate::types::Address;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON array of deliveries loaded into the store at startup
    pub deliveries_seed: Option<PathBuf>,

    /// JSON array of couriers loaded into the store at startup
    pub couriers_seed: Option<PathBuf>,

    /// Delay added to every store call
    pub store_latency: Duration,

    /// Pickup used for import rows without one
    pub import_defaults: ImportDefaults,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from a variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_latency = match var("STORE_LATENCY_MS") {
            Some(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("STORE_LATENCY_MS must be a number of milliseconds, got '{}'", raw))?;
                Duration::from_millis(ms)
            }
            None => Duration::ZERO,
        };

        if store_latency > Duration::from_secs(60) {
            anyhow::bail!(
                "STORE_LATENCY_MS is {}ms, the store would be unusable (max 60000)",
                store_latency.as_millis()
            );
        }

        let pickup = Address {
            name: var("DEFAULT_PICKUP_NAME").unwrap_or_else(|| DEFAULT_PICKUP_NAME.to_string()),
            street: var("DEFAULT_PICKUP_STREET").unwrap_or_else(|| DEFAULT_PICKUP_STREET.to_string()),
            city: var("DEFAULT_PICKUP_CITY").unwrap_or_else(|| DEFAULT_PICKUP_CITY.to_string()),
            postcode: var("DEFAULT_PICKUP_POSTCODE")
                .unwrap_or_else(|| DEFAULT_PICKUP_POSTCODE.to_string()),
            coordinates: None,
        };

        Ok(Self {
            deliveries_seed: var("DELIVERIES_SEED").map(PathBuf::from),
            couriers_seed: var("COURIERS_SEED").map(PathBuf::from),
            store_latency,
            import_defaults: ImportDefaults { pickup },
        })
    }
}
