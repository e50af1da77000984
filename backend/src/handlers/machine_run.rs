//! Machine run HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::TenantContext;
use crate::services::machine_run::{
    MachineRunService, PreviewInput, SaveMachineRunInput, UpdateStatusInput,
};
use crate::AppState;

fn service(state: &AppState) -> MachineRunService {
    MachineRunService::new(
        state.db.clone(),
        state.config.retry.clone(),
        state.config.calculation.tolerance(),
    )
}

/// List an order's machine runs
pub async fn list_machine_runs(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).list_by_order(&tenant, order_id).await {
        Ok(runs) => {
            (StatusCode::OK, Json(serde_json::json!({ "machine_runs": runs }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a machine run with its bags and cross-checks
pub async fn get_machine_run(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).get(&tenant, run_id).await {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Save a new machine run from the wizard
pub async fn create_machine_run(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<SaveMachineRunInput>,
) -> impl IntoResponse {
    match service(&state).create(&tenant, order_id, input).await {
        Ok(run) => (StatusCode::CREATED, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Replace a machine run's inputs, bags and cross-checks
pub async fn update_machine_run(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(run_id): Path<Uuid>,
    Json(input): Json<SaveMachineRunInput>,
) -> impl IntoResponse {
    match service(&state).update(&tenant, run_id, input).await {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Change a machine run's status
pub async fn update_machine_run_status(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(run_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> impl IntoResponse {
    match service(&state).update_status(&tenant, run_id, input.status).await {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a machine run
pub async fn delete_machine_run(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).delete(&tenant, run_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Computed outputs and advisory flags for a saved run
pub async fn get_machine_run_summary(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).summary(&tenant, run_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Computed outputs for a form that has not been saved yet
pub async fn preview_calculation(
    State(state): State<AppState>,
    Json(input): Json<PreviewInput>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(service(&state).preview(&input)))
}
