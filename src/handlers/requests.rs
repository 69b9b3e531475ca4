//! Standalone history endpoints
//!
//! Read and clear the same store as the webhook handler. These requests are
//! not recorded themselves.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::models::RequestRecord;
use crate::AppState;

/// List recorded requests, newest first
pub async fn list(State(state): State<AppState>) -> Json<Vec<RequestRecord>> {
    let records = state.history.list();
    tracing::debug!(total = records.len(), "Returning request history");
    Json(records)
}

/// Clear recorded requests
pub async fn clear(State(state): State<AppState>) -> Json<Value> {
    state.history.clear();
    tracing::info!("Requests cleared");
    Json(json!({ "message": "Requests cleared" }))
}
