//! `venuecast-worker` -- playlist generation service.
//!
//! Keeps every venue's daily playlist in step with its advertisement demand.
//! Runs three background loops against PostgreSQL: the daily empty-day pass,
//! the demand-driven task queue consumer and the stuck task watchdog.
//! See [`WorkerConfig::from_env`] for the environment variables.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use venuecast_core::loading::AirtimeLoadEvaluator;
use venuecast_worker::config::WorkerConfig;
use venuecast_worker::drivers::{DemandDriver, EmptyDayDriver};
use venuecast_worker::generator::PlaylistGenerator;
use venuecast_worker::pg_store::PgStore;
use venuecast_worker::watchdog::{StuckTaskWatchdog, TracingReporter};

/// How long each loop gets to wind down after cancellation.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "venuecast_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid worker configuration");
        std::process::exit(1);
    });

    // --- Database ---
    let pool = venuecast_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        });
    if let Err(e) = venuecast_db::health_check(&pool).await {
        tracing::error!(error = %e, "Database health check failed");
        std::process::exit(1);
    }
    if let Err(e) = venuecast_db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }
    tracing::info!("Database ready");

    // --- Generation ---
    let store = Arc::new(PgStore::new(pool));
    let generator = Arc::new(PlaylistGenerator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(AirtimeLoadEvaluator::new(config.overload_threshold)),
    ));

    let cancel = CancellationToken::new();

    // Spawn the daily empty-day pass.
    let empty_day = EmptyDayDriver::new(
        Arc::clone(&generator),
        store.clone(),
        config.bulk_generation_at,
        config.unit_delay,
    );
    let empty_day_cancel = cancel.clone();
    let empty_day_handle = tokio::spawn(async move {
        empty_day.run(empty_day_cancel).await;
    });

    // Spawn the task queue consumer.
    let demand = Arc::new(DemandDriver::new(
        Arc::clone(&generator),
        store.clone(),
        store.clone(),
        config.demand_poll_interval,
        config.unit_delay,
        cancel.clone(),
    ));
    let demand_handle = tokio::spawn(async move {
        demand.run().await;
    });

    // Spawn the watchdog.
    let watchdog = StuckTaskWatchdog::new(
        store.clone(),
        Arc::new(TracingReporter),
        config.watchdog_interval,
        config.max_generation,
    );
    let watchdog_cancel = cancel.clone();
    let watchdog_handle = tokio::spawn(async move {
        watchdog.run(watchdog_cancel).await;
    });

    tracing::info!(
        bulk_generation_at = %config.bulk_generation_at,
        unit_delay_ms = config.unit_delay.as_millis() as u64,
        "Worker started"
    );

    shutdown_signal().await;

    // --- Shutdown ---
    cancel.cancel();
    let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, empty_day_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, demand_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, watchdog_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
