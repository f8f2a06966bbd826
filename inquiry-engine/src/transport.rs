use crate::{InquiryError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::error;

/// Outbound header set, ordered for stable logging
pub type Headers = BTreeMap<String, String>;

/// Raw bank answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Single-attempt HTTP call with a caller-chosen timeout
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Vec<u8>,
        headers: &Headers,
        timeout: Duration,
    ) -> Result<TransportResponse>;
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Vec<u8>,
        headers: &Headers,
        timeout: Duration,
    ) -> Result<TransportResponse> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| InquiryError::Transport(format!("invalid method {}: {}", method, e)))?;

        let mut request = self.client.request(method, url).timeout(timeout).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to send request to {}: {}", url, e);
            InquiryError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", url, e);
            InquiryError::Transport(e.to_string())
        })?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
