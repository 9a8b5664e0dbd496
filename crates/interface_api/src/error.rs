//! API error handling
//!
//! Maps domain errors onto the HTTP taxonomy: validation and balance
//! failures are 422, state-transition and concurrency failures are
//! 409, missing or inactive references are 404.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_documents::DocumentError;
use domain_ledger::LedgerError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::AccountNotFound(_)
            | LedgerError::AccountInactive(_)
            | LedgerError::EntryNotFound(_) => ApiError::NotFound(err.to_string()),

            LedgerError::Unbalanced { .. }
            | LedgerError::NoLines
            | LedgerError::InvalidLine { .. }
            | LedgerError::Calculation(_) => ApiError::Validation(err.to_string()),

            LedgerError::InvalidStatus { .. }
            | LedgerError::AccountAlreadyExists(_)
            | LedgerError::DuplicateAccountNumber(_)
            | LedgerError::DuplicateEntryNumber(_)
            | LedgerError::VersionConflict { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match &err {
            DocumentError::DocumentNotFound(_) | DocumentError::PaymentNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }

            DocumentError::NoLineItems
            | DocumentError::InvalidLineItem { .. }
            | DocumentError::EmptyAllocation
            | DocumentError::InsufficientSourceBalance { .. }
            | DocumentError::TargetOverAllocation { .. }
            | DocumentError::InvalidPartyMismatch { .. }
            | DocumentError::InvalidTarget { .. }
            | DocumentError::InvalidAmount(_) => ApiError::Validation(err.to_string()),

            DocumentError::InvalidPhase { .. }
            | DocumentError::DuplicateDocumentNumber(_)
            | DocumentError::VersionConflict { .. } => ApiError::Conflict(err.to_string()),

            DocumentError::ControlAccountMissing(_) => ApiError::Internal(err.to_string()),

            DocumentError::Ledger(inner) => match inner {
                LedgerError::AccountNotFound(_)
                | LedgerError::AccountInactive(_)
                | LedgerError::EntryNotFound(_) => ApiError::NotFound(err.to_string()),
                LedgerError::InvalidStatus { .. } | LedgerError::VersionConflict { .. } => {
                    ApiError::Conflict(err.to_string())
                }
                _ => ApiError::Validation(err.to_string()),
            },
        }
    }
}
