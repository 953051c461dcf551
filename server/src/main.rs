//! Movie ticket booking HTTP server.
//!
//! Connects to `PostgreSQL` when it can and otherwise serves every booking
//! from process memory.

mod config;
mod metrics;

use anyhow::Context;
use cinema_booking_core::BookingService;
use cinema_booking_postgres::{ConnectionSettings, PostgresBookingStore};
use cinema_booking_web::{AppState, build_router};
use config::Config;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cinema_booking=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cinema booking server");

    let config = Config::from_env();
    info!(
        bind = %config.bind_address(),
        seats_per_showtime = config.booking.seats_per_showtime,
        "Configuration loaded"
    );

    let metrics_handle = metrics::install()?;

    let service = match connect_durable(&config.database).await {
        Ok(store) => {
            info!("Durable store ready");
            BookingService::new(Arc::new(store))
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Durable store unavailable at startup, serving from memory");
            BookingService::fallback_only()
        }
    }
    .with_seats_per_showtime(config.booking.seats_per_showtime);
    info!(backend = service.backend_mode().as_str(), "Booking service initialized");

    let app = build_router(AppState::new(service)).merge(metrics::router(metrics_handle));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    tokio::select! {
        result = server => result?,
        () = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(timeout_secs = config.server.shutdown_timeout, "Shutdown timeout elapsed, closing open connections");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Connect the pool and make sure the schema exists.
async fn connect_durable(settings: &ConnectionSettings) -> anyhow::Result<PostgresBookingStore> {
    let store = PostgresBookingStore::connect(settings)
        .await
        .context("connecting to PostgreSQL")?;
    store
        .bootstrap_schema()
        .await
        .context("bootstrapping booking schema")?;
    Ok(store)
}

/// Graceful shutdown signal handler.
///
/// Listens for:
/// - SIGTERM (sent by container orchestrators)
/// - SIGINT (Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
