//! HTTP query service for the order feed.
//!
//! Serves the orders collected by the ingest loop as JSON, together with
//! health and Prometheus metrics endpoints. Handlers only ever read from the
//! [`OrderStore`]; they never wait on the broker.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use ingest::IngestStatus;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/metrics", get(routes::metrics::get::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/latest", get(routes::orders::latest::<S>))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the shared application state for the query service.
pub fn create_state<S: OrderStore + 'static>(
    store: S,
    ingest_status: IngestStatus,
    metrics_handle: PrometheusHandle,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        store,
        ingest_status,
        metrics_handle,
    })
}
