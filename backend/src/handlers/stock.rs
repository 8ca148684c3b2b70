//! HTTP handlers for stock ledger endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::{MessageResponse, StockLine, StockReceipt};

use crate::error::{ApiResult, Operation};
use crate::middleware::CurrentUser;
use crate::AppState;

const STOCK_UPDATED: &str = "Stock updated successfully";

/// Record newly received stock
pub async fn receive_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(receipt): Json<StockReceipt>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    state
        .stock
        .receive_stock(&current_user.0.actor(), receipt)
        .await
        .map_err(|e| e.during(Operation::ReceiveStock))?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new(STOCK_UPDATED))))
}

/// Override the day's open stock
pub async fn set_today_open_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(receipt): Json<StockReceipt>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .stock
        .set_today_open_stock(&current_user.0.actor(), receipt)
        .await
        .map_err(|e| e.during(Operation::SetOpenStock))?;
    Ok(Json(MessageResponse::new(STOCK_UPDATED)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStockResponse {
    pub open_stock: Vec<StockLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingStockResponse {
    pub existing_stock: Vec<StockLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStockDaysResponse {
    pub open_stock_days: Vec<StockLine>,
}

/// List all open-stock lines
pub async fn get_open_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> ApiResult<Json<OpenStockResponse>> {
    let open_stock = state
        .stock
        .open_stock()
        .await
        .map_err(|e| e.during(Operation::GetOpenStock))?;
    Ok(Json(OpenStockResponse { open_stock }))
}

/// List today's existing stock, falling back to today's open stock
pub async fn get_existing_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> ApiResult<Json<ExistingStockResponse>> {
    let existing_stock = state
        .stock
        .existing_stock(super::today())
        .await
        .map_err(|e| e.during(Operation::GetExistingStock))?;
    Ok(Json(ExistingStockResponse { existing_stock }))
}

/// List all open-stock-day snapshots
pub async fn get_open_stock_days(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> ApiResult<Json<OpenStockDaysResponse>> {
    let open_stock_days = state
        .stock
        .open_stock_days()
        .await
        .map_err(|e| e.during(Operation::GetOpenStockDays))?;
    Ok(Json(OpenStockDaysResponse { open_stock_days }))
}
