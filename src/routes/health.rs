//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub ai_parsing: String,
}

/// Liveness probe. OK whenever the process is serving.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: database ping plus whether an AI key is configured.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            format!("error: {e}")
        }
    };

    let ai_parsing = if state.config.ai.default_api_key.is_some() {
        "configured"
    } else {
        "per-request credential only"
    };

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        database: db_status,
        ai_parsing: ai_parsing.to_string(),
    })
}
