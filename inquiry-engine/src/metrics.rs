//! Inquiry engine metrics

use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static::lazy_static! {
    pub static ref INQUIRY_OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "inquiry_outcomes_total",
        "Inquiry outcomes by response code",
        &["code"]
    )
    .unwrap();

    pub static ref BANK_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "inquiry_bank_request_duration_seconds",
        "Bank inquiry request duration",
        &["bank"]
    )
    .unwrap();

    pub static ref TOKEN_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "inquiry_token_lookups_total",
        "Access tokens served by source (cache, durable, bank)",
        &["source"]
    )
    .unwrap();
}

pub fn record_outcome(code: &str) {
    INQUIRY_OUTCOMES_TOTAL.with_label_values(&[code]).inc();
}

pub fn record_token_lookup(source: &str) {
    TOKEN_LOOKUPS_TOTAL.with_label_values(&[source]).inc();
}

pub fn observe_bank_request(bank: &str, seconds: f64) {
    BANK_REQUEST_DURATION
        .with_label_values(&[bank])
        .observe(seconds);
}

/// Prometheus text exposition of the default registry
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
