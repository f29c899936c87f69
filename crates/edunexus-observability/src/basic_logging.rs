use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console-only logging, used when the full stack is compiled out or
/// switched off with `OBSERVABILITY_ENABLED=false`.
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (default `info`) applies
/// to the application crates and noisy dependencies are held at `warn`.
pub fn init_basic_console_logging() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "edunexus={level},edunexus_core={level},edunexus_db={level},tower_http=warn,hyper=warn,sqlx=warn"
        ))
    });

    let console = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    // A second init (tests, CLI reuse) is not an error worth failing over.
    let _ = tracing_subscriber::registry().with(console).try_init();
}
