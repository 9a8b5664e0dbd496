//! Payment handlers
//!
//! Payments are recorded through the document routes; this module is
//! the read side across all families.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::PaymentId;

use crate::dto::documents::PaymentResponse;
use crate::error::ApiError;
use crate::AppState;

/// Lists every recorded payment, oldest first
pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let engine = state.engine.read().await;
    Ok(Json(
        engine
            .registry
            .payments()
            .into_iter()
            .map(PaymentResponse::from_payment)
            .collect(),
    ))
}

/// Gets a payment by ID
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let engine = state.engine.read().await;
    let payment_id = PaymentId::from(id);
    let payment = engine
        .registry
        .get_payment(&payment_id)
        .ok_or_else(|| ApiError::NotFound(format!("Payment not found: {payment_id}")))?;
    Ok(Json(PaymentResponse::from_payment(payment)))
}
