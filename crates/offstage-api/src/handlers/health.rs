use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

#[derive(serde::Serialize)]
struct HealthCheckResponse {
    status: String,
    database: String,
}

/// Health check: process is up and the database answers.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = HealthCheckResponse {
        status: "healthy".to_string(),
        database: "unknown".to_string(),
    };

    let mut overall_healthy = true;

    match tokio::time::timeout(TIMEOUT, sqlx::query("SELECT 1").execute(&state.db_pool)).await {
        Ok(Ok(_)) => {
            response.database = "healthy".to_string();
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database health check failed");
            response.database = format!("unhealthy: {}", e);
            overall_healthy = false;
        }
        Err(_) => {
            tracing::error!("Database health check timed out");
            response.database = "timeout".to_string();
            overall_healthy = false;
        }
    }

    if !overall_healthy {
        response.status = "unhealthy".to_string();
    }

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
