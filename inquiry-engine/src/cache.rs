use crate::{InquiryError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

/// Cache TTL policy (in seconds)
pub mod ttl {
    /// Subtracted from the bank-issued lifetime
    pub const EXPIRY_MARGIN: i64 = crate::TOKEN_EXPIRY_MARGIN_SECS;
    /// Floor applied when the lifetime is at or below the margin
    pub const MINIMUM: u64 = 30;
}

/// Cache key suffix
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
}

/// `"<bankIdentity>:access_token"`
pub fn token_key(bank_identity: &str) -> String {
    format!("{}:{}", bank_identity, keys::ACCESS_TOKEN)
}

/// TTL for a token with the given lifetime. Always strictly positive.
pub fn token_ttl_secs(lifetime_secs: i64) -> u64 {
    if lifetime_secs <= ttl::EXPIRY_MARGIN {
        ttl::MINIMUM
    } else {
        (lifetime_secs - ttl::EXPIRY_MARGIN) as u64
    }
}

/// Fast, expiring token store
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// `Ok(None)` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn exists(&self, key: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct RedisTokenCache {
    redis: ConnectionManager,
}

impl RedisTokenCache {
    pub fn new(redis: ConnectionManager) -> Self {
        RedisTokenCache { redis }
    }

    /// Round-trip used by the startup connectivity check
    pub async fn ping(&self) -> Result<()> {
        let _: String = redis::cmd("PING")
            .query_async(&mut self.redis.clone())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        if ttl_secs == 0 {
            return Err(InquiryError::Cache(format!("invalid ttl for {}: 0", key)));
        }

        let _: () = self
            .redis
            .clone()
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| InquiryError::Cache(format!("failed to set {}: {}", key, e)))?;

        debug!("Cached {} for {}s", key, ttl_secs);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.redis.clone().get::<_, Option<String>>(key).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let found = self.redis.clone().exists::<_, bool>(key).await?;
        Ok(found)
    }
}
