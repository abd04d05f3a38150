//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    /// `"ok"`, or `"degraded"` when the database probe fails.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health
///
/// Always answers 200 so load balancers can distinguish "process up but
/// database down" (`degraded`) from "process gone" (no answer at all).
async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let db_healthy = dealflow_db::health_check(&state.pool).await.is_ok();

    Json(ApiResponse::ok(HealthStatus {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
