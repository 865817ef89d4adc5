use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /ping - liveness, never touches the store
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// GET /health - pings the item store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.items.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "message": e.to_string() })),
            )
        }
    }
}
