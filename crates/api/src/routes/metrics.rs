//! Prometheus metrics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use ingest::IngestState;
use order_store::OrderStore;

use super::orders::AppState;

/// GET /metrics — returns Prometheus-formatted metrics.
///
/// `ingest_consuming` is sampled at scrape time from the ingest status.
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let consuming = state.ingest_status.state() == IngestState::Consuming;
    metrics::gauge!("ingest_consuming").set(if consuming { 1.0 } else { 0.0 });

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics_handle.render(),
    )
}
