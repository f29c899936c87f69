use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use edunexus::router::init_router;
use edunexus::state::init_app_state;
use edunexus_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    edunexus_observability::init_tracing();

    let server = ServerConfig::from_env();
    let state = init_app_state().await;
    edunexus_db::run_migrations(&state.db)
        .await
        .context("Failed to run database migrations")?;

    spawn_metrics_server(&server);

    let app = init_router(state);
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    edunexus_observability::shutdown_tracer().await;
    result.context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Prometheus exposition on its own port, off the public router.
#[cfg(feature = "observability")]
fn spawn_metrics_server(server: &ServerConfig) {
    let Some(handle) = edunexus_observability::init_metrics() else {
        return;
    };
    let address = format!("{}:{}", server.host, server.metrics_port);
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, address = %address, "Metrics server failed to bind");
                return;
            }
        };
        info!(address = %address, "Metrics server listening");
        if let Err(e) = axum::serve(listener, edunexus_observability::metrics_app(handle)).await {
            error!(error = %e, "Metrics server stopped");
        }
    });
}

#[cfg(not(feature = "observability"))]
fn spawn_metrics_server(_server: &ServerConfig) {}
