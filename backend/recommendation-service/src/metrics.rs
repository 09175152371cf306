use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Recommendation calls by content kind.
    pub static ref RECOMMENDATION_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "recommendation_requests_total",
        "Recommendation requests segmented by content kind",
        &["kind"]
    )
    .expect("failed to register recommendation_requests_total");

    /// Items surfaced (and logged) by content kind.
    pub static ref RECOMMENDED_ITEMS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "recommended_items_total",
        "Recommended items returned segmented by content kind",
        &["kind"]
    )
    .expect("failed to register recommended_items_total");

    pub static ref RECOMMENDATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "recommendation_duration_seconds",
        "Time to build a recommendation page",
        &["kind"]
    )
    .expect("failed to register recommendation_duration_seconds");

    /// Interactions recorded; unknown types share the `other` label.
    pub static ref INTERACTIONS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "interactions_recorded_total",
        "Recorded user interactions segmented by kind and type",
        &["kind", "interaction_type"]
    )
    .expect("failed to register interactions_recorded_total");

    /// Interest upserts (created/updated/failed).
    pub static ref INTEREST_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "interest_updates_total",
        "Per-category interest updates segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register interest_updates_total");
}

/// Render the default registry in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
