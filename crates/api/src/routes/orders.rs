//! Order query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ingest::IngestStatus;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{Order, OrderStore};

use crate::error::ApiError;

/// Body message returned when the store has no orders yet.
pub const NO_ORDERS_MESSAGE: &str = "No orders available";

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub store: S,
    pub ingest_status: IngestStatus,
    pub metrics_handle: PrometheusHandle,
}

/// GET /orders — list every order received so far, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Order>> {
    let orders = state.store.list_all().await;
    tracing::debug!(count = orders.len(), "listing orders");
    Json(orders)
}

/// GET /orders/latest — the most recently received order.
#[tracing::instrument(skip(state))]
pub async fn latest<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Order>, ApiError> {
    state
        .store
        .get_latest()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(NO_ORDERS_MESSAGE.to_string()))
}
