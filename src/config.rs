use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

/// Which price an order line is charged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    /// Current price from the products table.
    #[default]
    Catalog,
    /// Price captured in the client cart when the item was added, when one was sent.
    Snapshot,
}

impl FromStr for PricingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(PricingPolicy::Catalog),
            "snapshot" => Ok(PricingPolicy::Snapshot),
            other => anyhow::bail!("unknown CHECKOUT_PRICING value `{other}`"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub metadata: MetadataConfig,
    pub pricing: PricingPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10);
        let jwt_ttl_hours = parse_or("JWT_TTL_HOURS", 24);

        let metadata = MetadataConfig {
            base_url: env::var("METADATA_API_URL")
                .unwrap_or_else(|_| "https://api.rawg.io/api".to_string()),
            api_key: env::var("METADATA_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(parse_or("METADATA_TIMEOUT_SECS", 8)),
        };

        let pricing = match env::var("CHECKOUT_PRICING") {
            Ok(value) => value.parse()?,
            Err(_) => PricingPolicy::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            metadata,
            pricing,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
