//! Error handling for the Tyre Stock Ledger
//!
//! The engine reports `AppError`. Handlers attach the operation that failed,
//! which decides the status and message used for storage failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::LedgerKey;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Item not found in stock: {0}")]
    StockNotFound(LedgerKey),

    #[error("Insufficient stock quantity for {key}: {available} available, {requested} requested")]
    InsufficientStock {
        key: LedgerKey,
        available: i64,
        requested: i64,
    },

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = shared::first_violation(&errors)
            .unwrap_or_else(|| ("request".to_string(), errors.to_string()));
        AppError::Validation { field, message }
    }
}

/// Result type alias for the engine
pub type AppResult<T> = Result<T, AppError>;

/// The externally visible operations, used to shape failure responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReceiveStock,
    SetOpenStock,
    RecordSale,
    GetOpenStock,
    GetExistingStock,
    GetOpenStockDays,
    GetSalesRecords,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::ReceiveStock | Operation::SetOpenStock => "Failed to update stock",
            Operation::RecordSale => "Failed to record sales",
            Operation::GetOpenStock => "Failed to get open stock",
            Operation::GetExistingStock => "Failed to get existing stock",
            Operation::GetOpenStockDays => "Failed to get open stock days",
            Operation::GetSalesRecords => "Failed to get sales records",
        }
    }

    /// Stock receipts report storage failures as server errors, the rest as bad requests
    fn failure_status(&self) -> StatusCode {
        match self {
            Operation::ReceiveStock | Operation::SetOpenStock => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An `AppError` bound to the operation it interrupted
#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub source: AppError,
}

impl AppError {
    pub fn during(self, operation: Operation) -> ApiError {
        ApiError {
            operation,
            source: self,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.source {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::StockNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Store(_) => self.operation.failure_status(),
        }
    }

    fn body(&self) -> ErrorResponse {
        let (message, error) = match &self.source {
            AppError::Forbidden => ("Forbidden".to_string(), None),
            AppError::StockNotFound(_) => ("Item not found in stock".to_string(), None),
            AppError::InsufficientStock { .. } => ("Insufficient stock quantity".to_string(), None),
            AppError::Validation { field, message } => (
                "Validation error".to_string(),
                Some(format!("{}: {}", field, message)),
            ),
            AppError::Store(e) => (
                self.operation.failure_message().to_string(),
                Some(e.to_string()),
            ),
        };
        ErrorResponse { message, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!(operation = ?self.operation, "Error: {:?}", self.source);
        } else {
            tracing::warn!(operation = ?self.operation, "Rejected: {}", self.source);
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;
