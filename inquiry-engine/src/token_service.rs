//! Two-tier access token management
//!
//! Lookups walk [`LOOKUP_ORDER`]: the Redis tier first, then the durable
//! store. A durable hit is copied back into Redis on a best-effort basis.
//! Fresh tokens are written to both tiers concurrently; either write may
//! fail without failing the refresh.

use crate::access_token::AccessTokenClient;
use crate::cache::{token_key, token_ttl_secs, TokenCache};
use crate::database::TokenRepository;
use crate::metrics;
use crate::models::{AccessToken, BankConfig};
use crate::{InquiryError, Result, TOKEN_EXPIRY_MARGIN_SECS};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A tier an active token can be served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    FastCache,
    DurableStore,
    /// Freshly granted by the bank
    Bank,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::FastCache => "cache",
            TokenSource::DurableStore => "durable",
            TokenSource::Bank => "bank",
        }
    }
}

/// Tiers consulted by [`TokenService::get_active_token`], in order
pub const LOOKUP_ORDER: [TokenSource; 2] = [TokenSource::FastCache, TokenSource::DurableStore];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToken {
    pub access_token: String,
    pub source: TokenSource,
}

pub struct TokenService {
    cache: Arc<dyn TokenCache>,
    repository: Arc<dyn TokenRepository>,
    client: Arc<AccessTokenClient>,
}

impl TokenService {
    pub fn new(
        cache: Arc<dyn TokenCache>,
        repository: Arc<dyn TokenRepository>,
        client: Arc<AccessTokenClient>,
    ) -> Self {
        TokenService {
            cache,
            repository,
            client,
        }
    }

    /// First token found along [`LOOKUP_ORDER`], or `TokenNotFound`
    pub async fn get_active_token(&self, bank_identity: &str) -> Result<ActiveToken> {
        for source in LOOKUP_ORDER {
            match self.lookup(source, bank_identity).await {
                Ok(Some(access_token)) => {
                    metrics::record_token_lookup(source.as_str());
                    return Ok(ActiveToken {
                        access_token,
                        source,
                    });
                }
                Ok(None) => debug!("No token for {} in {}", bank_identity, source.as_str()),
                Err(e) => warn!(
                    "Token lookup for {} in {} failed: {}",
                    bank_identity,
                    source.as_str(),
                    e
                ),
            }
        }

        Err(InquiryError::TokenNotFound(bank_identity.to_string()))
    }

    async fn lookup(&self, source: TokenSource, bank_identity: &str) -> Result<Option<String>> {
        match source {
            TokenSource::FastCache => {
                let value = self.cache.get(&token_key(bank_identity)).await?;
                Ok(value.filter(|token| !token.is_empty()))
            }
            TokenSource::DurableStore => {
                let Some(token) = self.repository.find_latest_valid_token(bank_identity).await?
                else {
                    return Ok(None);
                };

                // Remaining validity plus the margin, so the cache expires with the row
                let lifetime = token.remaining_secs(Utc::now()) + TOKEN_EXPIRY_MARGIN_SECS;
                if let Err(e) = self
                    .cache_token(bank_identity, &token.access_token, lifetime)
                    .await
                {
                    warn!("Failed to repopulate cached token for {}: {}", bank_identity, e);
                }

                Ok(Some(token.access_token))
            }
            TokenSource::Bank => Ok(None),
        }
    }

    /// Durable write, one transaction
    pub async fn persist_new_token(&self, token: &AccessToken) -> Result<()> {
        self.repository.save_token(token).await
    }

    /// Cache write with the margin-and-floor TTL
    pub async fn cache_token(
        &self,
        bank_identity: &str,
        access_token: &str,
        lifetime_secs: i64,
    ) -> Result<()> {
        self.cache
            .set(
                &token_key(bank_identity),
                access_token,
                token_ttl_secs(lifetime_secs),
            )
            .await
    }

    pub async fn has_cached_token(&self, bank_identity: &str) -> Result<bool> {
        self.cache.exists(&token_key(bank_identity)).await
    }

    /// Acquire a token from the bank and store it in both tiers.
    ///
    /// Runs on a detached task: dropping the returned future does not abort
    /// the grant or the writes that follow it.
    pub async fn refresh(self: &Arc<Self>, cfg: Arc<BankConfig>) -> Result<String> {
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.acquire_and_store(&cfg).await });
        handle.await?
    }

    async fn acquire_and_store(&self, cfg: &BankConfig) -> Result<String> {
        let grant = self.client.acquire(cfg).await?;
        let token = AccessToken::issued(
            cfg.identity(),
            grant.access_token,
            grant.expires_in,
            Utc::now(),
        );

        info!(
            step = "ensure_token",
            bank_name = %cfg.bank_name,
            "Access token retrieved, saving to database and redis"
        );
        for failure in self.save_new_token(&token).await {
            warn!(
                step = "ensure_token",
                bank_name = %cfg.bank_name,
                "Failed to save new access token: {}",
                failure
            );
        }

        metrics::record_token_lookup(TokenSource::Bank.as_str());
        Ok(token.access_token)
    }

    /// Both writes run as independent tasks and are joined before returning.
    /// Returns every failure; an empty list means both tiers were written.
    pub async fn save_new_token(&self, token: &AccessToken) -> Vec<InquiryError> {
        let durable = {
            let repository = Arc::clone(&self.repository);
            let token = token.clone();
            tokio::spawn(async move { repository.save_token(&token).await })
        };

        let cached = {
            let cache = Arc::clone(&self.cache);
            let key = token_key(&token.bank_name);
            let value = token.access_token.clone();
            let ttl = token_ttl_secs(token.expires_in);
            tokio::spawn(async move { cache.set(&key, &value, ttl).await })
        };

        let (durable, cached) = tokio::join!(durable, cached);

        [durable, cached]
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(join) => Some(InquiryError::from(join)),
            })
            .collect()
    }
}
