//! MoMo gate service - HTTP API for payment-gated content.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use momo_gate_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,momo_gate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MoMo gate service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        momo_configured = %config.momo.is_some(),
        auth_configured = %config.auth_secret.is_some(),
        max_gates_per_user = %config.max_gates_per_user,
        poll_interval_ms = %config.poll_policy.interval.as_millis(),
        poll_max_attempts = %config.poll_policy.max_attempts,
        poll_ceiling_secs = %config.poll_policy.ceiling().as_secs(),
        "Service configuration loaded"
    );

    let state = AppState::new(config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
