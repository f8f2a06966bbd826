use crate::error::{ErrorCode, ErrorDetail, ErrorSource};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Partner credentials and endpoints for one bank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BankConfig {
    pub bank_code: String,
    pub bank_name: String,
    pub internal_inquiry_url: String,
    pub external_inquiry_url: String,
    pub access_token_url: String,
    pub base_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub partner_id: String,
    pub channel_id: String,
}

impl BankConfig {
    /// Identity used to key tokens in both tiers
    pub fn identity(&self) -> &str {
        &self.bank_name
    }

    pub fn access_token_endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.access_token_url)
    }
}

/// Token as issued by a bank, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessToken {
    pub bank_name: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build a record issued at `issued_at`; expiry keeps a safety margin.
    ///
    /// Lifetimes past the representable range clamp to the latest instant
    /// (or to `issued_at` when negative) instead of overflowing.
    pub fn issued(
        bank_name: &str,
        access_token: String,
        expires_in: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let lifetime = expires_in.saturating_sub(crate::TOKEN_EXPIRY_MARGIN_SECS);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|d| issued_at.checked_add_signed(d))
            .unwrap_or(if lifetime > 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                issued_at
            });

        Self {
            bank_name: bank_name.to_string(),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
        }
    }

    /// Lifetime left at `now`, in seconds (negative once expired)
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

/// SNAP access token grant response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapAccessTokenResponse {
    pub response_code: String,
    pub response_message: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Durable record of one answered inquiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub merchant_code: String,
    pub partner_reference_no: String,
    pub beneficiary_account: String,
    pub beneficiary_bank_code: String,
    pub beneficiary_account_name: String,
    pub inquiry_date: DateTime<Utc>,
    pub status: String,
}

/// The only shape bank adapters hand back to the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBankResponse {
    pub account_name: String,
    pub response_message: String,
}

/// Inbound inquiry body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRequest {
    pub company_id: String,
    #[serde(rename = "beneficary_account")]
    pub beneficiary_account: String,
    pub partner_reference_no: String,
    pub bank_code: String,
    /// `bifast` or `online`; absent means online
    #[serde(rename = "type", default)]
    pub inquiry_type: String,
}

impl InquiryRequest {
    pub fn is_bifast(&self) -> bool {
        self.inquiry_type == "bifast"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryData {
    #[serde(rename = "beneficary_account")]
    pub beneficiary_account: String,
    pub bank_code: String,
    pub beneficiary_name: String,
}

/// Uniform response envelope for every outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryResponse {
    pub status: bool,
    pub code: ErrorCode,
    pub message: String,
    pub source: ErrorSource,
    pub data: InquiryData,
}

impl InquiryResponse {
    pub fn success(data: InquiryData) -> Self {
        Self {
            status: true,
            code: ErrorCode::Success,
            message: "Inquiry successful".to_string(),
            source: ErrorSource::Bank,
            data,
        }
    }

    pub fn failure(detail: &ErrorDetail) -> Self {
        Self {
            status: false,
            code: detail.code,
            message: detail.message.to_string(),
            source: detail.source,
            data: InquiryData::default(),
        }
    }
}
