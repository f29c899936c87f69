//! EduNexus observability.
//!
//! Console, rolling-file and JSON logging, OpenTelemetry export, Prometheus
//! metrics and the request logging/metrics middleware.
//!
//! Everything beyond console logging sits behind the `observability` feature
//! (on by default). At runtime `OBSERVABILITY_ENABLED=false` switches the full
//! stack off and falls back to [`init_basic_console_logging`].
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() {
//!     edunexus_observability::init_tracing();
//!     // ... serve ...
//!     edunexus_observability::shutdown_tracer().await;
//! }
//! ```

mod basic_logging;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware,
    track_centre_registered, track_document_generated, track_identifier_exhausted,
    track_identifier_retry, track_jwt_issued, track_login_failure, track_login_success,
    track_student_registered,
};

#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub fn track_centre_registered(_source: &str) {}
    pub fn track_student_registered(_registration_type: &str) {}
    pub fn track_document_generated(_kind: &str) {}
    pub fn track_identifier_retry(_identifier: &str) {}
    pub fn track_identifier_exhausted(_identifier: &str) {}
    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_jwt_issued() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
