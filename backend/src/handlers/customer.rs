//! Customer HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::TenantContext;
use crate::services::customer::{CreateCustomerInput, CustomerService, UpdateCustomerInput};
use crate::AppState;

/// List the organization's customers
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.list(&tenant).await {
        Ok(customers) => {
            (StatusCode::OK, Json(serde_json::json!({ "customers": customers }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a customer
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.get(&tenant, customer_id).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(input): Json<CreateCustomerInput>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.create(&tenant, input).await {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.update(&tenant, customer_id, input).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.delete(&tenant, customer_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
