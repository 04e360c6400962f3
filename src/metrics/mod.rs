// Metrics module for Prometheus observability
// Author: nofomo contributors

mod registry;

pub use registry::{
    gather_metrics, IMAGE_BYTES, REQUESTS_TOTAL, REQUEST_DURATION, UPSTREAM_CALLS,
    UPSTREAM_DURATION,
};

/// Helper to record request metrics
pub fn record_request(method: &str, endpoint: &str, status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, endpoint, &status])
        .observe(duration_secs);
}

/// Helper to record an upstream call (`openai`, `google_search`, `image_host`)
pub fn record_upstream_call(service: &str, status_code: u16, duration_secs: f64) {
    UPSTREAM_CALLS
        .with_label_values(&[service, &status_code.to_string()])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[service])
        .observe(duration_secs);
}

pub fn record_image_size(mime_type: &str, bytes: usize) {
    IMAGE_BYTES
        .with_label_values(&[mime_type])
        .observe(bytes as f64);
}
