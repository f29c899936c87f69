//! Prometheus metrics: HTTP traffic plus registration, document and
//! identifier-allocation counters.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::error;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Reads `OBSERVABILITY_ENABLED` once; anything but `false`/`0` enables.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when observability is off or a recorder is already
/// installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| error!(error = %e, "Failed to install Prometheus recorder"))
        .ok()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(started.elapsed().as_secs_f64());

    response
}

/// Router served on the separate metrics port.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_centre_registered(source: &str) {
    if is_observability_enabled() {
        counter!("centres_registered_total", "source" => source.to_string()).increment(1);
    }
}

pub fn track_student_registered(registration_type: &str) {
    if is_observability_enabled() {
        counter!("students_registered_total", "registration_type" => registration_type.to_string())
            .increment(1);
    }
}

pub fn track_document_generated(kind: &str) {
    if is_observability_enabled() {
        counter!("documents_generated_total", "kind" => kind.to_string()).increment(1);
    }
}

/// A generated identifier collided with an existing row and was regenerated.
pub fn track_identifier_retry(identifier: &str) {
    if is_observability_enabled() {
        counter!("identifier_retries_total", "identifier" => identifier.to_string()).increment(1);
    }
}

pub fn track_identifier_exhausted(identifier: &str) {
    if is_observability_enabled() {
        counter!("identifier_exhausted_total", "identifier" => identifier.to_string()).increment(1);
    }
}

pub fn track_login_success(role: &str) {
    if is_observability_enabled() {
        counter!("logins_total", "role" => role.to_string(), "status" => "success").increment(1);
    }
}

pub fn track_login_failure(reason: &str) {
    if is_observability_enabled() {
        counter!("logins_total", "status" => "failure", "reason" => reason.to_string()).increment(1);
    }
}

pub fn track_jwt_issued() {
    if is_observability_enabled() {
        counter!("jwt_tokens_issued_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware};
    use tower::ServiceExt;

    #[tokio::test]
    async fn middleware_passes_response_through() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(crate::logging::logging_middleware));

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn tracking_without_recorder_is_a_noop() {
        track_centre_registered("online");
        track_identifier_retry("enrollment_no");
        track_document_generated("certificate");
    }
}
