//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder; the handle renders `/metrics`.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "ableconnect_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ableconnect_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "ableconnect_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "ableconnect_rate_limit_hits_total";
    pub const EMAILS_ATTEMPTED_TOTAL: &str = "ableconnect_emails_attempted_total";
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

pub fn record_email_attempt(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::EMAILS_ATTEMPTED_TOTAL, &labels).increment(1);
}

/// Collapse id-bearing path segments so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let parents = [
        "jobs",
        "applications",
        "users",
        "content",
        "resume",
        "certificate",
        "reset-password",
        "employer",
    ];
    // Fixed route words that can follow a parent segment.
    let literals = [
        "resume",
        "certificate",
        "jobseeker",
        "employer",
        "saved",
        "me",
        "profile",
    ];

    let mut out = String::new();
    let mut replace_next = false;
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        out.push('/');
        if replace_next && !literals.contains(&segment) {
            out.push_str(":id");
            replace_next = false;
        } else {
            out.push_str(segment);
            replace_next = parents.contains(&segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// HTTP metrics middleware.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_segments_are_collapsed() {
        assert_eq!(sanitize_path("/api/jobs/abc123/save"), "/api/jobs/:id/save");
        assert_eq!(
            sanitize_path("/api/applications/j1_u1/status"),
            "/api/applications/:id/status"
        );
        assert_eq!(
            sanitize_path("/api/applications/resume/171_cv.pdf"),
            "/api/applications/resume/:id"
        );
        assert_eq!(
            sanitize_path("/api/applications/jobseeker"),
            "/api/applications/jobseeker"
        );
        assert_eq!(
            sanitize_path("/api/applications/employer/abc123"),
            "/api/applications/employer/:id"
        );
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
