//! Route definitions for the Tyre Stock Ledger

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock and sales ledgers
        .merge(ledger_routes(state))
}

/// Stock and sales ledger routes (protected)
fn ledger_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stock", post(handlers::receive_stock))
        .route(
            "/stock/open",
            get(handlers::get_open_stock).put(handlers::set_today_open_stock),
        )
        .route("/stock/existing", get(handlers::get_existing_stock))
        .route("/stock/open-days", get(handlers::get_open_stock_days))
        .route(
            "/sales",
            get(handlers::get_sales_records).post(handlers::record_sale),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
