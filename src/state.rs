use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    config::{AppConfig, PricingPolicy},
    db::{DbPool, OrmConn, orm_from_pool},
    metadata::MetadataClient,
};

/// Signing material for session tokens.
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub metadata: MetadataClient,
    pub jwt: Arc<JwtKeys>,
    pub pricing: PricingPolicy,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            orm: orm_from_pool(&pool),
            pool,
            metadata: MetadataClient::new(&config.metadata)?,
            jwt: Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_ttl_hours)),
            pricing: config.pricing,
        })
    }
}
