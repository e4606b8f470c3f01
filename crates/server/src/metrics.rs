use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static MANUAL_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_manual_requests_total",
        "Manual unlock requests queued"
    )
    .expect("register manual_requests_total")
});

pub static MANUAL_UNLOCKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_manual_unlocks_total",
        "Manual unlocks approved by an admin"
    )
    .expect("register manual_unlocks_total")
});

pub static SUBSCRIPTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_subscriptions_total",
        "Subscriptions recorded from payment webhooks"
    )
    .expect("register subscriptions_total")
});

pub static STATUS_CHECKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_status_checks_total",
        "Unlock and subscription status checks served"
    )
    .expect("register status_checks_total")
});

pub static ADMIN_FORBIDDEN_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_admin_forbidden_total",
        "Admin calls rejected for a missing or wrong secret"
    )
    .expect("register admin_forbidden_total")
});

pub static STORAGE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "unlock_relay_storage_errors_total",
        "Store operations that failed to read or persist"
    )
    .expect("register storage_errors_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        MANUAL_REQUESTS_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("unlock_relay_manual_requests_total"));
    }
}
