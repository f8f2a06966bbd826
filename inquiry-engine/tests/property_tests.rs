//! Property-based tests for token TTLs, request signing and status mapping

use inquiry_engine::cache::token_ttl_secs;
use inquiry_engine::signer::request_signature;
use inquiry_engine::{ErrorCode, ErrorDetail, ErrorSource};
use proptest::prelude::*;

// ============================================================================
// Token TTL
// ============================================================================

proptest! {
    /// Property: lifetimes at or below the margin always get the 30s floor
    #[test]
    fn ttl_floor_for_short_lifetimes(lifetime in -10_000i64..=30) {
        prop_assert_eq!(token_ttl_secs(lifetime), 30);
    }

    /// Property: longer lifetimes lose exactly the margin
    #[test]
    fn ttl_subtracts_margin(lifetime in 31i64..10_000_000) {
        prop_assert_eq!(token_ttl_secs(lifetime), (lifetime - 30) as u64);
    }

    /// Property: TTL is never zero
    #[test]
    fn ttl_strictly_positive(lifetime in any::<i32>()) {
        prop_assert!(token_ttl_secs(lifetime as i64) > 0);
    }
}

// ============================================================================
// Request signature
// ============================================================================

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9:/._+-]{1,32}"
}

proptest! {
    /// Property: identical inputs produce identical signatures
    #[test]
    fn signature_is_deterministic(
        method in field(), url in field(), token in field(),
        hash in field(), ts in field(), secret in field(),
    ) {
        let a = request_signature(&method, &url, &token, &hash, &ts, &secret).unwrap();
        let b = request_signature(&method, &url, &token, &hash, &ts, &secret).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Property: changing any single input changes the signature
    #[test]
    fn signature_depends_on_every_input(
        inputs in proptest::collection::vec(field(), 6),
        position in 0usize..6,
        suffix in "[a-z]{1,4}",
    ) {
        let sign = |v: &[String]| request_signature(&v[0], &v[1], &v[2], &v[3], &v[4], &v[5]).unwrap();

        let original = sign(&inputs[..]);
        let mut changed = inputs.clone();
        changed[position].push_str(&suffix);

        prop_assert_ne!(original, sign(&changed[..]));
    }

    /// Property: signatures are 64 lowercase hex characters
    #[test]
    fn signature_is_hex_sha256(
        method in field(), url in field(), token in field(),
        hash in field(), ts in field(), secret in field(),
    ) {
        let sig = request_signature(&method, &url, &token, &hash, &ts, &secret).unwrap();
        prop_assert_eq!(sig.len(), 64);
        prop_assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

// ============================================================================
// Bank status mapping
// ============================================================================

proptest! {
    /// Property: every non-200 status maps to a bank-sourced code, and codes
    /// outside the fixed table are BANK_UNKNOWN_ERROR
    #[test]
    fn status_mapping_is_total(status in 100u16..1000) {
        prop_assume!(status != 200);
        let detail = ErrorDetail::for_bank_status(status);
        prop_assert_eq!(detail.source, ErrorSource::Bank);

        let expected = match status {
            400 => ErrorCode::InvalidBody,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::ForbiddenFeature,
            404 => ErrorCode::AccountNotFound,
            409 => ErrorCode::DuplicateReference,
            500 => ErrorCode::BankInternalError,
            504 => ErrorCode::BankTimeout,
            _ => ErrorCode::BankUnknownError,
        };
        prop_assert_eq!(detail.code, expected);
    }
}

#[test]
fn fixed_table_entries() {
    let table = [
        (400, ErrorCode::InvalidBody),
        (401, ErrorCode::Unauthorized),
        (403, ErrorCode::ForbiddenFeature),
        (404, ErrorCode::AccountNotFound),
        (409, ErrorCode::DuplicateReference),
        (500, ErrorCode::BankInternalError),
        (504, ErrorCode::BankTimeout),
    ];

    for (status, code) in table {
        assert_eq!(ErrorDetail::for_bank_status(status).code, code);
    }
}
