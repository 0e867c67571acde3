/// Health check endpoint

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// `GET /health`
///
/// Reports liveness plus database reachability, so a load balancer can pull
/// an instance whose pool has gone bad.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match shopstack_shared::db::pool::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "version": shopstack_shared::VERSION,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check database failure: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unreachable",
                    "version": shopstack_shared::VERSION,
                })),
            )
        }
    }
}
