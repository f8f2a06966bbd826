//! SNAP-style signing
//!
//! - RSA (PKCS#1 v1.5, SHA-256) signature over `clientKey|timestamp` for the
//!   token grant, base64 encoded
//! - HMAC-SHA256 signature over
//!   `method:url:token:bodyHash:timestamp:` for every authenticated call,
//!   hex encoded
//!
//! Both paths share one timestamp profile: seconds precision with a numeric
//! `+07:00` offset, never `Z`.

use crate::{InquiryError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Offset every bank expects in `X-TIMESTAMP`
pub const SNAP_UTC_OFFSET_SECS: i32 = 7 * 3600;

const SNAP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+07:00";

/// Format an instant in the wire timestamp profile
pub fn snap_timestamp(at: DateTime<Utc>) -> String {
    (at.naive_utc() + Duration::seconds(SNAP_UTC_OFFSET_SECS as i64))
        .format(SNAP_TIMESTAMP_FORMAT)
        .to_string()
}

/// Parse a PEM private key, PKCS#8 first and PKCS#1 second
pub fn load_private_key(pem: &str) -> Result<RsaPrivateKey> {
    match RsaPrivateKey::from_pkcs8_pem(pem) {
        Ok(key) => Ok(key),
        Err(pkcs8_err) => RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
            InquiryError::KeyLoad(format!(
                "not a PKCS#8 ({}) or PKCS#1 ({}) RSA private key",
                pkcs8_err, pkcs1_err
            ))
        }),
    }
}

/// Signature sent as `X-SIGNATURE` on the token grant
pub fn sign_access_token_request(
    key: &RsaPrivateKey,
    client_key: &str,
    timestamp: &str,
) -> Result<String> {
    let string_to_sign = format!("{}|{}", client_key, timestamp);
    let hashed = Sha256::digest(string_to_sign.as_bytes());

    let signature = key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(|e| InquiryError::Signing(e.to_string()))?;

    Ok(STANDARD.encode(signature))
}

/// Lowercase hex SHA-256 of a request body
pub fn sha256_hex(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Signature sent as `X-SIGNATURE` on inquiry calls
pub fn request_signature(
    method: &str,
    url: &str,
    access_token: &str,
    body_hash: &str,
    timestamp: &str,
    client_secret: &str,
) -> Result<String> {
    let string_to_sign = format!(
        "{}:{}:{}:{}:{}:",
        method, url, access_token, body_hash, timestamp
    );

    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|e| InquiryError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
