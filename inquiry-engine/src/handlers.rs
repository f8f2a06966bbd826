use crate::bank_config::BankConfigCache;
use crate::error::{ErrorCode, ErrorDetail};
use crate::metrics;
use crate::models::{InquiryRequest, InquiryResponse};
use crate::orchestrator::InquiryOrchestrator;
use crate::token_service::TokenService;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Correlation header, also sent to the bank as `X-EXTERNAL-ID`
pub const PARTNER_REFERENCE_HEADER: &str = "X-PARTNER-REFERENCE";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<InquiryOrchestrator>,
    pub configs: Arc<BankConfigCache>,
    pub tokens: Arc<TokenService>,
}

/// HTTP status for a response code
pub fn http_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Success => StatusCode::OK,
        ErrorCode::InternalConnectionError | ErrorCode::BankNoResponse | ErrorCode::BankTimeout => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ErrorCode::AccountNotFound => StatusCode::NOT_FOUND,
        ErrorCode::DuplicateReference => StatusCode::CONFLICT,
        ErrorCode::BankInternalError => StatusCode::BAD_GATEWAY,
        ErrorCode::ClientMissingHeader | ErrorCode::ClientErrorRequest => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(response: InquiryResponse) -> HttpResponse {
    HttpResponse::build(http_status(response.code)).json(response)
}

/// Account inquiry
pub async fn inquiry(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let started = Instant::now();

    let external_id = match req
        .headers()
        .get(PARTNER_REFERENCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(id) => id.to_string(),
        None => {
            warn!("Rejected inquiry without {}", PARTNER_REFERENCE_HEADER);
            return respond(InquiryResponse::failure(&ErrorDetail::missing_header()));
        }
    };

    let request: InquiryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(trace_id = %external_id, "Invalid inquiry body: {}", e);
            return respond(InquiryResponse::failure(&ErrorDetail::invalid_request()));
        }
    };

    let response = state.orchestrator.inquire(&request, &external_id).await;

    info!(
        trace_id = %external_id,
        code = %response.code,
        processing_time_ms = started.elapsed().as_millis() as u64,
        "Inquiry request handled"
    );
    respond(response)
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut banks = Vec::new();
    for cfg in state.configs.loaded() {
        let token_cached = match state.tokens.has_cached_token(cfg.identity()).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Token cache check for {} failed: {}", cfg.bank_name, e);
                false
            }
        };
        banks.push(json!({
            "bank_code": cfg.bank_code,
            "bank_name": cfg.bank_name,
            "token_cached": token_cached,
        }));
    }

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "inquiry-engine",
        "version": env!("CARGO_PKG_VERSION"),
        "loaded_banks": state.configs.len(),
        "default_bank_code": state.configs.default_bank_code(),
        "banks": banks,
    }))
}

/// Reload partner bank configs
pub async fn reload_banks(state: web::Data<AppState>) -> HttpResponse {
    match state.configs.reload().await {
        Ok(count) => HttpResponse::Ok().json(json!({
            "status": "reloaded",
            "loaded_banks": count,
        })),
        Err(e) => {
            error!("Bank config reload failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "message": e.to_string(),
            }))
        }
    }
}

pub async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::render())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/inquiry", web::post().to(inquiry))
            .route("/health", web::get().to(health_check))
            .route("/banks/reload", web::post().to(reload_banks)),
    )
    .route("/metrics", web::get().to(metrics_endpoint));
}
