//! Order feed entry point: starts the ingest loop and the HTTP query service.

use std::time::Duration;

use api::config::Config;
use ingest::{IngestLoop, IngestOutcome};
use order_store::InMemoryOrderStore;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const INGEST_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Create the order store and the ingest loop feeding it
    let store = InMemoryOrderStore::new();
    let broker = config.broker();
    let ingest =
        IngestLoop::new(store.clone(), broker).with_reconnect_policy(config.reconnect_policy());
    let ingest_status = ingest.status();

    // 4. Start consuming in the background; the store is the only shared state
    let (stop_ingest, shutdown) = watch::channel(false);
    tracing::info!(queue = %config.queue, "starting order ingestion");
    let ingest_task = tokio::spawn(ingest.run(shutdown));

    // 5. Build the application
    let state = api::create_state(store, ingest_status, metrics_handle);
    let app = api::create_app(state);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // 7. Close the broker connection before exiting
    let _ = stop_ingest.send(true);
    match tokio::time::timeout(INGEST_SHUTDOWN_TIMEOUT, ingest_task).await {
        Ok(Ok(IngestOutcome::Stopped)) => tracing::info!("order ingestion shut down"),
        Ok(Ok(IngestOutcome::Failed(err))) => {
            tracing::warn!(error = %err, "order ingestion had already failed");
        }
        Ok(Err(err)) => tracing::error!(error = %err, "order ingestion task panicked"),
        Err(_) => tracing::warn!("timed out waiting for the broker connection to close"),
    }

    tracing::info!("server shut down gracefully");
}
