//! Admit REST API Server
//!
//! This binary starts the admit REST API server, exposing the gated pull
//! and analysis-refresh triggers and the analysis report.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use admit_client::{GradCafeClient, StandardizerEnum};
use admit_core::traits::Standardizer;
use admit_core::{BusyGate, HttpConfig};

use admit_server::{AppState, ServerConfig, create_router};

/// How long shutdown waits for a running pull or refresh to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::parse();

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url())
        .await
        .context("Failed to connect to database")?;
    info!("Database connection established");

    let scrape_config = config.scrape_config();
    let client = GradCafeClient::with_config(
        &scrape_config.base_url,
        HttpConfig::default(),
        scrape_config.robots.clone(),
    )
    .context("Failed to initialize GradCafe client")?;
    let standardizer = StandardizerEnum::from_options(
        config.standardizer_url.as_deref(),
        config.heuristic_standardizer,
    )
    .context("Failed to initialize standardizer")?;
    info!(
        base_url = %scrape_config.base_url,
        pages = scrape_config.num_pages,
        standardizer = standardizer.name(),
        "Pull pipeline configured"
    );

    let shutdown_token = CancellationToken::new();

    let app_state = AppState::new(
        pool,
        client,
        standardizer,
        scrape_config,
        shutdown_token.clone(),
    );
    app_state
        .repo
        .ensure_schema()
        .await
        .context("Failed to prepare database schema")?;

    let gate = app_state.coordinator.gate().clone();
    let app = create_router(app_state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Starting admit API server on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token, gate))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// New triggers are refused once the token is cancelled. A running pull or
/// refresh gets up to [`DRAIN_TIMEOUT`] to finish.
async fn shutdown_signal(shutdown_token: CancellationToken, gate: BusyGate) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
    shutdown_token.cancel();

    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while gate.is_busy() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    if gate.is_busy() {
        warn!(operation = ?gate.holder(), "Shutting down with an operation still running");
    }
}
