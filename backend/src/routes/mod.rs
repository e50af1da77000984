//! Route definitions for the Breastmilk Processing Operations Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::tenant_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/customers", customer_routes())
        .nest("/orders", order_routes())
        .nest("/machine-runs", machine_run_routes())
        .route("/calculations/preview", post(handlers::preview_calculation))
        .route("/dashboard/stats", get(handlers::get_dashboard_stats))
        .route_layer(middleware::from_fn_with_state(state, tenant_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Everything else is scoped to the caller's organization
        .merge(protected)
}

/// Customer routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
}

/// Order routes, including the runs under each order
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route(
            "/:order_id/machine-runs",
            get(handlers::list_machine_runs).post(handlers::create_machine_run),
        )
}

/// Machine run routes
fn machine_run_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:run_id",
            get(handlers::get_machine_run)
                .put(handlers::update_machine_run)
                .delete(handlers::delete_machine_run),
        )
        .route("/:run_id/status", put(handlers::update_machine_run_status))
        .route("/:run_id/summary", get(handlers::get_machine_run_summary))
}
