//! Order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::TenantContext;
use crate::services::order::{CreateOrderInput, OrderFilter, OrderService, UpdateOrderInput};
use crate::AppState;

/// List orders with their customers, optionally by status
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(filter): Query<OrderFilter>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.list(&tenant, filter).await {
        Ok(orders) => (StatusCode::OK, Json(serde_json::json!({ "orders": orders }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an order with its customer
pub async fn get_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.get(&tenant, order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create an order
pub async fn create_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(input): Json<CreateOrderInput>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.create(&tenant, input).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an order, including its status
pub async fn update_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.update(&tenant, order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an order
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.delete(&tenant, order_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
