//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ingest::IngestSnapshot;
use order_store::OrderStore;
use serde::Serialize;

use super::orders::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ingest: IngestSnapshot,
    pub orders: usize,
}

/// GET /health — returns process health, ingest state and order count.
///
/// Always 200: a failed ingest loop does not stop the query side from
/// serving what it already has.
pub async fn check<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ingest: state.ingest_status.current(),
        orders: state.store.len().await,
    })
}
