//! In-memory stand-ins for Postgres, Redis and the bank HTTP transport

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use inquiry_engine::access_token::{AccessTokenClient, PrivateKeySource};
use inquiry_engine::bank_config::BankConfigCache;
use inquiry_engine::cache::TokenCache;
use inquiry_engine::database::{InquiryRepository, PartnerRepository, TokenRepository};
use inquiry_engine::models::{AccessToken, BankConfig, InquiryRecord, InquiryRequest};
use inquiry_engine::orchestrator::InquiryOrchestrator;
use inquiry_engine::token_service::TokenService;
use inquiry_engine::transport::{Headers, Transport, TransportResponse};
use inquiry_engine::{InquiryError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PKCS8_PEM: &str = include_str!("../fixtures/private_key_pkcs8.pem");
pub const TOKEN_PATH: &str = "/openapi/v1.0/access-token/b2b";

// ============================================================================
// Fast cache
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenCache {
    entries: Mutex<HashMap<String, (String, u64)>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryTokenCache {
    pub fn insert(&self, key: &str, value: &str, ttl_secs: u64) {
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), ttl_secs));
    }

    pub fn entry(&self, key: &str) -> Option<(String, u64)> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InquiryError::Cache("redis unavailable".into()));
        }
        self.insert(key, value, ttl_secs);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(InquiryError::Cache("redis unavailable".into()));
        }
        Ok(self.entries.lock().get(key).map(|(value, _)| value.clone()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().contains_key(key))
    }
}

// ============================================================================
// Durable store
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenRepository {
    pub tokens: Mutex<Vec<AccessToken>>,
    pub fail_writes: AtomicBool,
    pub lookups: AtomicUsize,
}

impl MemoryTokenRepository {
    /// Seed a token that stays valid for `valid_for_secs`
    pub fn seed(&self, bank_name: &str, access_token: &str, valid_for_secs: i64) {
        self.tokens.lock().push(AccessToken {
            bank_name: bank_name.to_string(),
            access_token: access_token.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: valid_for_secs + 30,
            expires_at: Utc::now() + ChronoDuration::seconds(valid_for_secs),
        });
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn save_token(&self, token: &AccessToken) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InquiryError::Persist("database unavailable".into()));
        }
        self.tokens.lock().push(token.clone());
        Ok(())
    }

    async fn find_latest_valid_token(&self, bank_identity: &str) -> Result<Option<AccessToken>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        Ok(self
            .tokens
            .lock()
            .iter()
            .filter(|t| t.bank_name == bank_identity && t.expires_at > now)
            .max_by_key(|t| t.expires_at)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryInquiryRepository {
    pub records: Mutex<Vec<InquiryRecord>>,
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl InquiryRepository for MemoryInquiryRepository {
    async fn save_inquiry(&self, record: &InquiryRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InquiryError::Persist("database unavailable".into()));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPartnerRepository {
    pub configs: Mutex<Vec<BankConfig>>,
    pub fail: AtomicBool,
}

impl MemoryPartnerRepository {
    pub fn with(configs: Vec<BankConfig>) -> Self {
        MemoryPartnerRepository {
            configs: Mutex::new(configs),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl PartnerRepository for MemoryPartnerRepository {
    async fn find_all_partner_configs(&self) -> Result<Vec<BankConfig>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(InquiryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.configs.lock().clone())
    }
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, Vec<u8>),
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Reply::Respond(status, body.as_bytes().to_vec())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Headers,
    pub timeout: Duration,
}

impl RecordedCall {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("recorded body is JSON")
    }
}

/// Answers by exact URL; unknown URLs fail like an unreachable host
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Reply>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn route(&self, url: &str, reply: Reply) {
        self.routes.lock().insert(url.to_string(), reply);
    }

    pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Vec<u8>,
        headers: &Headers,
        timeout: Duration,
    ) -> Result<TransportResponse> {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            url: url.to_string(),
            body,
            headers: headers.clone(),
            timeout,
        });

        let reply = self.routes.lock().get(url).cloned();
        match reply {
            Some(Reply::Respond(status, body)) => Ok(TransportResponse { status, body }),
            Some(Reply::Fail(message)) => Err(InquiryError::Transport(message)),
            None => Err(InquiryError::Transport(format!("connection refused: {}", url))),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn bank_config(bank_code: &str, bank_name: &str) -> BankConfig {
    let host = format!("https://{}.bank.test", bank_name.to_lowercase());
    BankConfig {
        bank_code: bank_code.to_string(),
        bank_name: bank_name.to_string(),
        internal_inquiry_url: format!("{}/openapi/v1.0/account-inquiry-internal", host),
        external_inquiry_url: format!("{}/openapi/v1.0/account-inquiry-external", host),
        access_token_url: TOKEN_PATH.to_string(),
        base_url: host,
        client_key: format!("{}-client-key", bank_name.to_lowercase()),
        client_secret: format!("{}-secret", bank_name.to_lowercase()),
        partner_id: "BRIEFCASH".to_string(),
        channel_id: "95051".to_string(),
    }
}

pub fn inquiry_request(bank_code: &str, inquiry_type: &str) -> InquiryRequest {
    InquiryRequest {
        company_id: "MCH-001".to_string(),
        beneficiary_account: "8000123456".to_string(),
        partner_reference_no: "PRN-20240101-0001".to_string(),
        bank_code: bank_code.to_string(),
        inquiry_type: inquiry_type.to_string(),
    }
}

pub struct Harness {
    pub cache: Arc<MemoryTokenCache>,
    pub token_repo: Arc<MemoryTokenRepository>,
    pub inquiries: Arc<MemoryInquiryRepository>,
    pub partners: Arc<MemoryPartnerRepository>,
    pub transport: Arc<ScriptedTransport>,
    pub configs: Arc<BankConfigCache>,
    pub tokens: Arc<TokenService>,
    pub orchestrator: Arc<InquiryOrchestrator>,
}

impl Harness {
    /// Wired with default bank "014" and the configs already loaded
    pub async fn new(configs: Vec<BankConfig>) -> Self {
        let cache = Arc::new(MemoryTokenCache::default());
        let token_repo = Arc::new(MemoryTokenRepository::default());
        let inquiries = Arc::new(MemoryInquiryRepository::default());
        let partners = Arc::new(MemoryPartnerRepository::with(configs));
        let transport = Arc::new(ScriptedTransport::default());

        let bank_configs = Arc::new(BankConfigCache::new(partners.clone(), "014"));
        bank_configs.reload().await.expect("partner configs load");

        let client = Arc::new(AccessTokenClient::new(
            transport.clone(),
            PrivateKeySource::Pem(PKCS8_PEM.to_string()),
            Duration::from_secs(10),
        ));
        let tokens = Arc::new(TokenService::new(cache.clone(), token_repo.clone(), client));

        let orchestrator = Arc::new(InquiryOrchestrator::new(
            bank_configs.clone(),
            tokens.clone(),
            transport.clone(),
            inquiries.clone(),
            Duration::from_secs(10),
        ));

        Harness {
            cache,
            token_repo,
            inquiries,
            partners,
            transport,
            configs: bank_configs,
            tokens,
            orchestrator,
        }
    }

    pub fn token_endpoint(cfg: &BankConfig) -> String {
        cfg.access_token_endpoint()
    }
}
