use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static STORE_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookshelf_store_mutations_total",
        "Committed read-modify-write cycles per collection",
        &["collection", "op"]
    )
    .expect("register store_mutations_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookshelf_store_errors_total",
        "Store operations that returned an error",
        &["collection", "kind"]
    )
    .expect("register store_errors_total")
});

pub static LOGIN_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bookshelf_login_failures_total",
        "Rejected authentication attempts"
    )
    .expect("register login_failures_total")
});

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}
