//! SNAP client-credentials grant

use crate::models::{BankConfig, SnapAccessTokenResponse};
use crate::signer;
use crate::transport::{Headers, Transport};
use crate::{InquiryError, Result};
use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Where the partner's RSA private key comes from
#[derive(Debug, Clone)]
pub enum PrivateKeySource {
    /// PEM file, read again on every acquisition
    File(PathBuf),
    /// PEM already in memory
    Pem(String),
}

impl PrivateKeySource {
    async fn read_pem(&self) -> Result<String> {
        match self {
            PrivateKeySource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                InquiryError::KeyLoad(format!(
                    "failed to read private key {}: {}",
                    path.display(),
                    e
                ))
            }),
            PrivateKeySource::Pem(pem) => Ok(pem.clone()),
        }
    }
}

pub struct AccessTokenClient {
    transport: Arc<dyn Transport>,
    key_source: PrivateKeySource,
    timeout: Duration,
}

impl AccessTokenClient {
    pub fn new(transport: Arc<dyn Transport>, key_source: PrivateKeySource, timeout: Duration) -> Self {
        AccessTokenClient {
            transport,
            key_source,
            timeout,
        }
    }

    /// Request a fresh token from the bank behind `cfg`.
    ///
    /// A 200 answer without an `accessToken` is `MissingAccessToken`.
    pub async fn acquire(&self, cfg: &BankConfig) -> Result<SnapAccessTokenResponse> {
        let pem = self.key_source.read_pem().await?;
        let key = signer::load_private_key(&pem)?;

        let timestamp = signer::snap_timestamp(Utc::now());
        let signature = signer::sign_access_token_request(&key, &cfg.client_key, &timestamp)?;

        let body = serde_json::to_vec(&json!({ "grant_type": "client_credentials" }))?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".into(), "application/json".into());
        headers.insert("X-TIMESTAMP".into(), timestamp);
        headers.insert("X-CLIENT-KEY".into(), cfg.client_key.clone());
        headers.insert("X-SIGNATURE".into(), signature);

        let endpoint = cfg.access_token_endpoint();
        info!(step = "ensure_token", bank_name = %cfg.bank_name, "Requesting access token from bank");

        let response = self
            .transport
            .send("POST", &endpoint, body, &headers, self.timeout)
            .await?;

        if response.status != 200 {
            error!(
                bank_name = %cfg.bank_name,
                status = response.status,
                "Access token request rejected"
            );
            return Err(InquiryError::TokenRequestRejected {
                status: response.status,
            });
        }

        let grant: SnapAccessTokenResponse = serde_json::from_slice(&response.body)?;
        if grant.access_token.is_empty() {
            error!(
                bank_name = %cfg.bank_name,
                response_code = %grant.response_code,
                "Access token missing from grant response"
            );
            return Err(InquiryError::MissingAccessToken);
        }

        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_file_is_key_load_error() {
        let source = PrivateKeySource::File(PathBuf::from("./does/not/exist.pem"));
        let err = source.read_pem().await.unwrap_err();
        assert!(matches!(err, InquiryError::KeyLoad(_)));
    }

    #[tokio::test]
    async fn test_in_memory_pem_is_returned_as_is() {
        let source = PrivateKeySource::Pem("pem-body".into());
        assert_eq!(source.read_pem().await.unwrap(), "pem-body");
    }
}
