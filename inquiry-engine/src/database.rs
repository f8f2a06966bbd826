use crate::models::{AccessToken, BankConfig, InquiryRecord};
use crate::{InquiryError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::debug;

/// Durable token rows
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn save_token(&self, token: &AccessToken) -> Result<()>;

    /// Most recent unexpired token for a bank; `Ok(None)` when there is none
    async fn find_latest_valid_token(&self, bank_identity: &str) -> Result<Option<AccessToken>>;
}

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn save_inquiry(&self, record: &InquiryRecord) -> Result<()>;
}

#[async_trait]
pub trait PartnerRepository: Send + Sync {
    async fn find_all_partner_configs(&self) -> Result<Vec<BankConfig>>;
}

pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for Database {
    async fn save_token(&self, token: &AccessToken) -> Result<()> {
        let persist = |e: sqlx::Error| {
            InquiryError::Persist(format!("failed to save token to database: {}", e))
        };

        let mut tx = self.pool.begin().await.map_err(persist)?;

        sqlx::query(
            r#"
            INSERT INTO access_token (bank_name, access_token, token_type, expires_in, expires_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&token.bank_name)
        .bind(&token.access_token)
        .bind(&token.token_type)
        .bind(token.expires_in)
        .bind(token.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(persist)?;

        tx.commit().await.map_err(persist)?;

        debug!("Saved access token for {}", token.bank_name);
        Ok(())
    }

    async fn find_latest_valid_token(&self, bank_identity: &str) -> Result<Option<AccessToken>> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            SELECT bank_name, access_token, token_type, expires_in, expires_date AS expires_at
            FROM access_token
            WHERE bank_name = $1 AND expires_date > NOW()
            ORDER BY expires_date DESC
            LIMIT 1
            "#,
        )
        .bind(bank_identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token.filter(|t| !t.access_token.is_empty()))
    }
}

#[async_trait]
impl InquiryRepository for Database {
    async fn save_inquiry(&self, record: &InquiryRecord) -> Result<()> {
        let persist =
            |e: sqlx::Error| InquiryError::Persist(format!("failed to save inquiry: {}", e));

        let mut tx = self.pool.begin().await.map_err(persist)?;

        sqlx::query(
            r#"
            INSERT INTO inquiry (
                merchant_code, partner_reference_no, beneficiary_account,
                beneficiary_bank_code, beneficiary_account_name, inquiry_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.merchant_code)
        .bind(&record.partner_reference_no)
        .bind(&record.beneficiary_account)
        .bind(&record.beneficiary_bank_code)
        .bind(&record.beneficiary_account_name)
        .bind(record.inquiry_date)
        .bind(&record.status)
        .execute(&mut *tx)
        .await
        .map_err(persist)?;

        tx.commit().await.map_err(persist)?;
        Ok(())
    }
}

#[async_trait]
impl PartnerRepository for Database {
    async fn find_all_partner_configs(&self) -> Result<Vec<BankConfig>> {
        let configs = sqlx::query_as::<_, BankConfig>(
            r#"
            SELECT
                partner.company_bank_code AS bank_code,
                domestic_bank.short_name AS bank_name,
                partner_url.internal_inquiry_url,
                partner_url.external_inquiry_url,
                partner_url.access_token_url,
                partner_url.base_url,
                partner_settings.api_key AS client_key,
                partner_settings.api_secret AS client_secret,
                partner_settings.partner_id,
                partner_settings.channel_id
            FROM partner
            INNER JOIN partner_url ON partner.company_id = partner_url.company_id
            INNER JOIN domestic_bank ON partner.company_id = domestic_bank.company_id
            INNER JOIN partner_settings ON partner.company_id = partner_settings.company_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(configs)
    }
}
