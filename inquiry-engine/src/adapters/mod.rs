//! Bank adapters
//!
//! One variant per supported bank plus a default. Two selection keys are
//! used and must stay separate:
//!
//! - [`BankAdapter::for_request`] keys on the bank code of the inbound
//!   request and decides the outbound body, URL and headers
//! - [`BankAdapter::for_response`] keys on the resolved config's bank code
//!   and decides how the answer is parsed

mod bca;
mod bri;
mod cimb;
mod permata;

use crate::models::{BankConfig, InquiryRequest, NormalizedBankResponse};
use crate::signer;
use crate::transport::Headers;
use crate::Result;
use serde::de::DeserializeOwned;

/// Bank codes with a dedicated adapter
pub mod codes {
    pub const BRI: &str = "002";
    pub const PERMATA: &str = "013";
    pub const BCA: &str = "014";
    pub const CIMB: &str = "022";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAdapter {
    Bca,
    Bri,
    Cimb,
    Permata,
    /// Unknown codes; behaves like BCA
    Default,
}

/// Parser output. `malformed` is set when the bytes did not match the
/// envelope at all, as opposed to fields merely being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub normalized: NormalizedBankResponse,
    pub malformed: bool,
}

impl BankAdapter {
    fn for_code(bank_code: &str) -> Self {
        match bank_code {
            codes::BRI => BankAdapter::Bri,
            codes::PERMATA => BankAdapter::Permata,
            codes::BCA => BankAdapter::Bca,
            codes::CIMB => BankAdapter::Cimb,
            _ => BankAdapter::Default,
        }
    }

    /// Variant that builds the outbound call, keyed by the request's bank code
    pub fn for_request(request_bank_code: &str) -> Self {
        Self::for_code(request_bank_code)
    }

    /// Variant that parses the answer, keyed by the resolved config's bank code
    pub fn for_response(config_bank_code: &str) -> Self {
        Self::for_code(config_bank_code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BankAdapter::Bca => "bca",
            BankAdapter::Bri => "bri",
            BankAdapter::Cimb => "cimb",
            BankAdapter::Permata => "permata",
            BankAdapter::Default => "default",
        }
    }

    /// Whether the internal (same-bank) shape is used for this request
    pub fn is_internal(&self, request: &InquiryRequest) -> bool {
        match self {
            BankAdapter::Bca | BankAdapter::Default => request.bank_code == codes::BCA,
            BankAdapter::Bri => request.bank_code == codes::BRI,
            BankAdapter::Cimb => request.bank_code == codes::CIMB,
            BankAdapter::Permata => true,
        }
    }

    /// Serialized outbound body. `timestamp` is the same value sent as
    /// `X-TIMESTAMP`.
    pub fn build_request_body(&self, request: &InquiryRequest, timestamp: &str) -> Result<Vec<u8>> {
        let internal = self.is_internal(request);
        match self {
            BankAdapter::Bca | BankAdapter::Default => bca::build_body(request, internal),
            BankAdapter::Bri => bri::build_body(request, internal),
            BankAdapter::Cimb => cimb::build_body(request, internal),
            BankAdapter::Permata => permata::build_body(request, timestamp),
        }
    }

    /// Endpoint the request is sent to
    pub fn target_url<'a>(&self, cfg: &'a BankConfig, request: &InquiryRequest) -> &'a str {
        if self.is_internal(request) {
            &cfg.internal_inquiry_url
        } else {
            &cfg.external_inquiry_url
        }
    }

    pub fn build_headers(
        &self,
        cfg: &BankConfig,
        request: &InquiryRequest,
        access_token: &str,
        external_id: &str,
        body: &[u8],
        timestamp: &str,
    ) -> Result<Headers> {
        match self {
            BankAdapter::Permata => Ok(permata::headers(request, timestamp)),
            _ => snap_headers(
                cfg,
                self.target_url(cfg, request),
                access_token,
                external_id,
                body,
                timestamp,
            ),
        }
    }

    /// Normalize a bank answer. Never fails; see [`ParsedResponse`].
    pub fn parse_response(&self, cfg: &BankConfig, status: u16, body: &[u8]) -> ParsedResponse {
        match self {
            BankAdapter::Bca | BankAdapter::Default => bca::parse(body),
            BankAdapter::Bri => bri::parse(status, body),
            BankAdapter::Cimb => cimb::parse(body),
            BankAdapter::Permata => permata::parse(cfg, body),
        }
    }
}

/// Headers shared by every SNAP bank
fn snap_headers(
    cfg: &BankConfig,
    signed_url: &str,
    access_token: &str,
    external_id: &str,
    body: &[u8],
    timestamp: &str,
) -> Result<Headers> {
    let body_hash = signer::sha256_hex(body);
    let signature = signer::request_signature(
        "POST",
        signed_url,
        access_token,
        &body_hash,
        timestamp,
        &cfg.client_secret,
    )?;

    let mut headers = Headers::new();
    headers.insert("Content-Type".into(), "application/json".into());
    headers.insert("Authorization".into(), format!("Bearer {}", access_token));
    headers.insert("X-TIMESTAMP".into(), timestamp.to_string());
    headers.insert("X-SIGNATURE".into(), signature);
    headers.insert("X-PARTNER-ID".into(), cfg.partner_id.clone());
    headers.insert("X-EXTERNAL-ID".into(), external_id.to_string());
    headers.insert("CHANNEL-ID".into(), cfg.channel_id.clone());
    Ok(headers)
}

/// Decode `body` as `T`, or degrade to an empty response carrying whatever
/// message sits at `message_pointer`.
fn decode<T, F>(body: &[u8], message_pointer: &str, normalize: F) -> ParsedResponse
where
    T: DeserializeOwned,
    F: FnOnce(T) -> NormalizedBankResponse,
{
    match serde_json::from_slice::<T>(body) {
        Ok(envelope) => ParsedResponse {
            normalized: normalize(envelope),
            malformed: false,
        },
        Err(e) => {
            tracing::warn!("Unparseable bank response: {}", e);
            let response_message = serde_json::from_slice::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .pointer(message_pointer)
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_default();

            ParsedResponse {
                normalized: NormalizedBankResponse {
                    account_name: String::new(),
                    response_message,
                },
                malformed: true,
            }
        }
    }
}

/// `"2"`-style service selector: bifast or online
fn service_type(request: &InquiryRequest, bifast: &'static str, online: &'static str) -> &'static str {
    if request.is_bifast() {
        bifast
    } else {
        online
    }
}
