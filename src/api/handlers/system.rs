//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::service::HealthReport;

/// `GET /health`: relay liveness and connection counts.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns relay status, current timestamp, producer and consumer connection counts, and the configured domain.",
    responses(
        (status = 200, description = "Relay is serving", body = HealthReport),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.liveness.report().await))
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
