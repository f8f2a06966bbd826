//! # Briefcash Inquiry Engine
//!
//! Account-inquiry gateway: resolves partner credentials for a beneficiary
//! bank, keeps a signed access token warm, forwards a bank-specific signed
//! request and normalizes the answer into one response envelope.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            InquiryOrchestrator               │
//! └──────┬──────────────┬──────────────┬─────────┘
//!        │              │              │
//! ┌──────▼─────┐ ┌──────▼──────┐ ┌─────▼────────┐
//! │ BankConfig │ │ TokenService│ │ BankAdapter  │
//! │   Cache    │ │ Redis + PG  │ │ BCA/BRI/CIMB │
//! └──────┬─────┘ └──────┬──────┘ │ Permata/Dflt │
//!        │              │        └─────┬────────┘
//!        │       ┌──────▼──────┐       │
//!        │       │   Signer    │       │
//!        │       └─────────────┘       │
//! ┌──────▼─────────────────────────────▼─────────┐
//! │       Postgres · Redis · HTTP transport      │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]

pub mod access_token;
pub mod adapters;
pub mod bank_config;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod signer;
pub mod token_service;
pub mod transport;

pub use bank_config::BankConfigCache;
pub use config::Config;
pub use error::{ErrorCode, ErrorDetail, ErrorSource, InquiryError, Result};
pub use orchestrator::InquiryOrchestrator;
pub use token_service::TokenService;

/// Seconds subtracted from a bank-issued token lifetime
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// Bank code whose config serves unknown codes
pub const DEFAULT_BANK_CODE: &str = "014";

/// Timeout for every bank-facing HTTP call (seconds)
pub const BANK_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Bound on storage connectivity checks at startup (seconds)
pub const STORAGE_CONNECT_TIMEOUT_SECS: u64 = 3;
