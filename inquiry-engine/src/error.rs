//! Error types and the caller-facing error taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for inquiry operations
pub type Result<T> = std::result::Result<T, InquiryError>;

/// Inquiry engine errors
#[derive(Error, Debug)]
pub enum InquiryError {
    /// Private key material could not be read or parsed
    #[error("Key load error: {0}")]
    KeyLoad(String),

    /// Asymmetric signing failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// No active token in either the fast cache or the durable store
    #[error("Access token not found for {0}")]
    TokenNotFound(String),

    /// Token endpoint answered with a non-200 status
    #[error("Access token request rejected with http status {status}")]
    TokenRequestRejected {
        /// HTTP status returned by the token endpoint
        status: u16,
    },

    /// Token grant succeeded but carried no access token
    #[error("Missing access token after refresh")]
    MissingAccessToken,

    /// Durable store write failed
    #[error("Persist error: {0}")]
    Persist(String),

    /// Fast cache write failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Partner config reload failed
    #[error("Config load error: {0}")]
    ConfigLoad(String),

    /// Network-level failure talking to a bank
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bank payload did not match the expected envelope
    #[error("Malformed bank response: {0}")]
    MalformedResponse(String),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Background task panicked or was cancelled
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Where a failure originated, as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// Destination bank
    Bank,
    /// Infrastructure inside the gateway
    Internal,
    /// Inbound caller
    Client,
}

/// Stable machine-readable response codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Success,
    InvalidBody,
    Unauthorized,
    ForbiddenFeature,
    AccountNotFound,
    DuplicateReference,
    BankInternalError,
    BankTimeout,
    BankUnknownError,
    BankNoResponse,
    BankFormatError,
    InternalConnectionError,
    InternalServerError,
    MissingAccessToken,
    ClientMissingHeader,
    ClientErrorRequest,
}

impl ErrorCode {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Success => "SUCCESS",
            ErrorCode::InvalidBody => "INVALID_BODY",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::ForbiddenFeature => "FORBIDDEN_FEATURE",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::DuplicateReference => "DUPLICATE_REFERENCE",
            ErrorCode::BankInternalError => "BANK_INTERNAL_ERROR",
            ErrorCode::BankTimeout => "BANK_TIMEOUT",
            ErrorCode::BankUnknownError => "BANK_UNKNOWN_ERROR",
            ErrorCode::BankNoResponse => "BANK_NO_RESPONSE",
            ErrorCode::BankFormatError => "BANK_FORMAT_ERROR",
            ErrorCode::InternalConnectionError => "INTERNAL_CONNECTION_ERROR",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::MissingAccessToken => "MISSING_ACCESS_TOKEN",
            ErrorCode::ClientMissingHeader => "CLIENT_MISSING_HEADER",
            ErrorCode::ClientErrorRequest => "CLIENT_ERROR_REQUEST",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: what the caller sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Response code
    pub code: ErrorCode,
    /// Human readable message
    pub message: &'static str,
    /// Failure origin
    pub source: ErrorSource,
}

impl ErrorDetail {
    const fn new(code: ErrorCode, message: &'static str, source: ErrorSource) -> Self {
        Self {
            code,
            message,
            source,
        }
    }

    /// Map a non-200 bank status to the fixed taxonomy. Total over `u16`.
    pub fn for_bank_status(status: u16) -> Self {
        use ErrorCode::*;
        let bank = ErrorSource::Bank;
        match status {
            400 => Self::new(InvalidBody, "Invalid payload request", bank),
            401 => Self::new(Unauthorized, "Access unauthorized", bank),
            403 => Self::new(ForbiddenFeature, "Service not allowed", bank),
            404 => Self::new(AccountNotFound, "Account number not found", bank),
            409 => Self::new(
                DuplicateReference,
                "Duplicate external id in same day",
                bank,
            ),
            500 => Self::new(
                BankInternalError,
                "Bank internal error, please use check status service",
                bank,
            ),
            504 => Self::new(
                BankTimeout,
                "Bank timeout, please use check status service",
                bank,
            ),
            _ => Self::new(BankUnknownError, "Unexpected error from bank", bank),
        }
    }

    pub fn connection_error() -> Self {
        Self::new(
            ErrorCode::InternalConnectionError,
            "Fail to send request to bank",
            ErrorSource::Internal,
        )
    }

    pub fn no_response() -> Self {
        Self::new(
            ErrorCode::BankNoResponse,
            "No response from bank",
            ErrorSource::Bank,
        )
    }

    pub fn format_error() -> Self {
        Self::new(
            ErrorCode::BankFormatError,
            "Invalid response format from bank",
            ErrorSource::Internal,
        )
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            ErrorCode::InternalServerError,
            "Internal server error occurred",
            ErrorSource::Internal,
        )
    }

    pub fn missing_access_token() -> Self {
        Self::new(
            ErrorCode::MissingAccessToken,
            "Missing access token from bank",
            ErrorSource::Internal,
        )
    }

    pub fn missing_header() -> Self {
        Self::new(
            ErrorCode::ClientMissingHeader,
            "Missing X-PARTNER-REFERENCE header",
            ErrorSource::Client,
        )
    }

    pub fn invalid_request() -> Self {
        Self::new(
            ErrorCode::ClientErrorRequest,
            "Invalid body request",
            ErrorSource::Client,
        )
    }
}

impl InquiryError {
    /// Classify a failure raised while obtaining an access token
    pub fn token_stage_detail(&self) -> ErrorDetail {
        match self {
            InquiryError::MissingAccessToken => ErrorDetail::missing_access_token(),
            InquiryError::Transport(_) | InquiryError::TokenRequestRejected { .. } => {
                ErrorDetail::connection_error()
            }
            InquiryError::Serialization(_) => ErrorDetail::format_error(),
            _ => ErrorDetail::internal_server_error(),
        }
    }
}
