//! Dashboard HTTP handlers

use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::error::AppResult;
use crate::middleware::TenantContext;
use crate::services::DashboardService;
use crate::AppState;

/// Organization-wide counters
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> AppResult<impl IntoResponse> {
    let stats = DashboardService::new(state.db.clone()).stats(&tenant).await?;
    Ok(Json(stats))
}
