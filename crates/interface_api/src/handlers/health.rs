//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (verifies the engine is reachable)
pub async fn readiness_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine.read().await;
    Json(HealthResponse {
        status: format!("ready ({})", engine.currency()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
