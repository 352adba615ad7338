//! Raffle Service - HTTP API and pages for the charity raffle
//!
//! This is the main entry point for the raffle service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raffle_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,raffle=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Raffle Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_configured = %config.database_url.is_some(),
        admin_pin_configured = %config.admin_pin.is_some(),
        session_ttl_seconds = config.session_ttl_seconds,
        "Service configuration loaded"
    );

    let state = AppState::connect(config.clone()).await?;

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
