//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

impl HealthResponse {
    fn new(database_up: bool) -> (StatusCode, Self) {
        let (code, status, database) = if database_up {
            (StatusCode::OK, "healthy", "connected")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
        };
        (
            code,
            HealthResponse {
                status,
                version: env!("CARGO_PKG_VERSION"),
                database,
            },
        )
    }
}

/// Liveness plus database connectivity
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    let (code, body) = HealthResponse::new(database_up);
    (code, Json(body))
}
