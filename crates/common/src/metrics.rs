use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "auto_shop_http_requests_total",
        "Total HTTP requests by method and status class",
        &["method", "class"]
    )
    .expect("register http_requests_total")
});

pub static PARTS_ALLOCATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "auto_shop_parts_allocated_total",
        "Serialized parts bound to a service ticket"
    )
    .expect("register parts_allocated_total")
});

pub static PARTS_RELEASED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "auto_shop_parts_released_total",
        "Serialized parts returned to stock"
    )
    .expect("register parts_released_total")
});

pub static ALLOCATION_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "auto_shop_allocation_conflicts_total",
        "Allocation attempts rejected because the stock was already taken"
    )
    .expect("register allocation_conflicts_total")
});

pub static RATE_LIMITED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "auto_shop_rate_limited_total",
        "Total requests rejected by rate limiter"
    )
    .expect("register rate_limited_total")
});

/// Bucket a status code into `2xx`/`4xx`/... for the request counter label.
pub fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

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
    fn status_classes() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
    }

    #[test]
    fn encoded_output_contains_registered_counters() {
        PARTS_ALLOCATED_TOTAL.inc();
        let (code, body) = encode_metrics();
        assert_eq!(code, axum::http::StatusCode::OK);
        assert!(body.contains("auto_shop_parts_allocated_total"));
    }
}
