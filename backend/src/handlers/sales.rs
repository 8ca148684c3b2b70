//! HTTP handlers for sales endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::{MessageResponse, SaleRecord, SaleRequest};

use crate::error::{ApiResult, Operation};
use crate::middleware::CurrentUser;
use crate::AppState;

/// Record a sale against the day's stock
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SaleRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    state
        .stock
        .record_sale(&current_user.0.actor(), super::today(), request)
        .await
        .map_err(|e| e.during(Operation::RecordSale))?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Stock updated successfully")),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecordsResponse {
    pub sales_records: Vec<SaleRecord>,
}

/// List every sale record
pub async fn get_sales_records(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> ApiResult<Json<SalesRecordsResponse>> {
    let sales_records = state
        .stock
        .sales_records()
        .await
        .map_err(|e| e.during(Operation::GetSalesRecords))?;
    Ok(Json(SalesRecordsResponse { sales_records }))
}
