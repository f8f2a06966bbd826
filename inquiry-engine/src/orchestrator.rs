//! Inquiry state machine
//!
//! `resolve_config → ensure_token → dispatch → classify_transport →
//! parse_response → classify_bank_status → persist → respond`
//!
//! Every path ends in an [`InquiryResponse`]; failures carry a classified
//! [`ErrorDetail`] and an empty data block.

use crate::adapters::BankAdapter;
use crate::bank_config::BankConfigCache;
use crate::database::InquiryRepository;
use crate::error::ErrorDetail;
use crate::metrics;
use crate::models::{BankConfig, InquiryData, InquiryRecord, InquiryRequest, InquiryResponse};
use crate::signer;
use crate::token_service::TokenService;
use crate::transport::Transport;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};

pub struct InquiryOrchestrator {
    configs: Arc<BankConfigCache>,
    tokens: Arc<TokenService>,
    transport: Arc<dyn Transport>,
    inquiries: Arc<dyn InquiryRepository>,
    request_timeout: Duration,
}

impl InquiryOrchestrator {
    pub fn new(
        configs: Arc<BankConfigCache>,
        tokens: Arc<TokenService>,
        transport: Arc<dyn Transport>,
        inquiries: Arc<dyn InquiryRepository>,
        request_timeout: Duration,
    ) -> Self {
        InquiryOrchestrator {
            configs,
            tokens,
            transport,
            inquiries,
            request_timeout,
        }
    }

    /// Run one inquiry. `external_id` is the caller's correlation id.
    pub async fn inquire(&self, request: &InquiryRequest, external_id: &str) -> InquiryResponse {
        let span = info_span!(
            "inquiry",
            bank_code = %request.bank_code,
            external_id = %external_id
        );

        let response = match self.run(request, external_id).instrument(span.clone()).await {
            Ok(data) => InquiryResponse::success(data),
            Err(detail) => InquiryResponse::failure(&detail),
        };

        metrics::record_outcome(response.code.as_str());
        span.in_scope(|| {
            info!(step = "respond", code = %response.code, "Inquiry finished");
        });
        response
    }

    async fn run(
        &self,
        request: &InquiryRequest,
        external_id: &str,
    ) -> Result<InquiryData, ErrorDetail> {
        let cfg = self.configs.lookup(&request.bank_code);
        info!(
            step = "resolve_config",
            bank_name = %cfg.bank_name,
            "Sending request through bank {}",
            cfg.bank_name
        );

        let access_token = self.ensure_token(&cfg).await?;

        let adapter = BankAdapter::for_request(&request.bank_code);
        let timestamp = signer::snap_timestamp(Utc::now());
        let body = adapter
            .build_request_body(request, &timestamp)
            .map_err(|e| {
                error!(step = "dispatch", "Failed to build request body: {}", e);
                ErrorDetail::internal_server_error()
            })?;
        let url = adapter.target_url(&cfg, request).to_string();
        let headers = adapter
            .build_headers(&cfg, request, &access_token, external_id, &body, &timestamp)
            .map_err(|e| {
                error!(step = "dispatch", "Failed to sign request: {}", e);
                ErrorDetail::internal_server_error()
            })?;

        info!(step = "dispatch", adapter = adapter.name(), "Sending inquiry to bank");
        let started = Instant::now();
        let sent = self
            .transport
            .send("POST", &url, body, &headers, self.request_timeout)
            .await;
        metrics::observe_bank_request(&cfg.bank_name, started.elapsed().as_secs_f64());

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                error!(step = "classify_transport", "Failed to send request to bank: {}", e);
                return Err(ErrorDetail::connection_error());
            }
        };

        if response.body.is_empty() {
            error!(
                step = "classify_transport",
                status = response.status,
                "Empty response from bank"
            );
            return Err(ErrorDetail::no_response());
        }

        let parsed = BankAdapter::for_response(&cfg.bank_code).parse_response(
            &cfg,
            response.status,
            &response.body,
        );

        if response.status == 200 && parsed.malformed {
            error!(step = "parse_response", "Invalid response format from bank");
            return Err(ErrorDetail::format_error());
        }

        if response.status != 200 {
            let detail = ErrorDetail::for_bank_status(response.status);
            error!(
                step = "classify_bank_status",
                status = response.status,
                code = %detail.code,
                "Bank error with message: {}",
                parsed.normalized.response_message
            );
            return Err(detail);
        }

        let record = InquiryRecord {
            merchant_code: request.company_id.clone(),
            partner_reference_no: external_id.to_string(),
            beneficiary_account: request.beneficiary_account.clone(),
            beneficiary_bank_code: request.bank_code.clone(),
            beneficiary_account_name: parsed.normalized.account_name.clone(),
            inquiry_date: Utc::now(),
            status: "SUCCESS".to_string(),
        };

        if let Err(e) = self.inquiries.save_inquiry(&record).await {
            error!(step = "persist", "Failed to save inquiry: {}", e);
            return Err(ErrorDetail::internal_server_error());
        }

        Ok(InquiryData {
            beneficiary_account: request.beneficiary_account.clone(),
            bank_code: request.bank_code.clone(),
            beneficiary_name: parsed.normalized.account_name,
        })
    }

    async fn ensure_token(&self, cfg: &Arc<BankConfig>) -> Result<String, ErrorDetail> {
        match self.tokens.get_active_token(cfg.identity()).await {
            Ok(active) => {
                info!(
                    step = "ensure_token",
                    source = active.source.as_str(),
                    "Using active access token"
                );
                Ok(active.access_token)
            }
            Err(e) => {
                warn!(step = "ensure_token", "{}, requesting a new one", e);
                self.tokens.refresh(Arc::clone(cfg)).await.map_err(|e| {
                    error!(step = "ensure_token", "Failed to get new access token: {}", e);
                    e.token_stage_detail()
                })
            }
        }
    }
}
