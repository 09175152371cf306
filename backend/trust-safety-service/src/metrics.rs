use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Moderation decisions by decision path and verdict.
    ///
    /// path: empty | mock | classifier | fail_open | fail_closed
    pub static ref MODERATION_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_decisions_total",
        "Moderation decisions segmented by decision path and verdict",
        &["path", "verdict"]
    )
    .expect("failed to register moderation_decisions_total");

    pub static ref MODERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "moderation_duration_seconds",
        "Time spent producing a moderation verdict",
        &["path"],
        vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("failed to register moderation_duration_seconds");

    pub static ref CLASSIFIER_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "moderation_classifier_errors_total",
        "External classifier calls that failed"
    )
    .expect("failed to register moderation_classifier_errors_total");

    /// Submissions refused by the blocking gate, by content type
    pub static ref CONTENT_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_content_rejected_total",
        "Content blocked before publication",
        &["content_type"]
    )
    .expect("failed to register moderation_content_rejected_total");
}

pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
