//! HTTP API Layer
//!
//! This crate provides the REST API for the bookkeeping engine using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for accounts, journal entries,
//!   documents, and reports
//! - **Middleware**: Authentication, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, state::{AppState, Engine}};
//!
//! let engine = Engine::bootstrap(currency)?;
//! let app = create_router(AppState::new(engine, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, documents, health, journal, payments, reports};
use crate::middleware::{audit_middleware, auth_middleware};
pub use crate::state::AppState;

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Account registry routes
    let account_routes = Router::new()
        .route("/", post(accounts::create_account))
        .route("/", get(accounts::list_accounts))
        .route("/:id", get(accounts::get_account))
        .route("/:id", put(accounts::update_account))
        .route("/:id/ledger", get(accounts::get_account_ledger));

    // Journal entry routes
    let journal_routes = Router::new()
        .route("/", post(journal::create_entry))
        .route("/", get(journal::list_entries))
        .route("/next-number", get(journal::next_number))
        .route("/:id", get(journal::get_entry))
        .route("/:id", put(journal::update_entry))
        .route("/:id", delete(journal::delete_entry))
        .route("/:id/post", post(journal::post_entry))
        .route("/:id/void", post(journal::void_entry))
        .route("/:id/reverse", post(journal::reverse_entry))
        .route("/:id/duplicate", post(journal::duplicate_entry));

    // Document routes, shared across the four kinds; :kind is one of
    // invoices, bills, credit-notes, debit-notes
    let document_routes = Router::new()
        .route("/", post(documents::create_document))
        .route("/", get(documents::list_documents))
        .route("/summary", get(documents::summary))
        .route("/next-number", get(documents::next_number))
        .route("/capabilities", get(documents::capabilities))
        .route("/:id", get(documents::get_document))
        .route("/:id", put(documents::update_document))
        .route("/:id", delete(documents::delete_document))
        .route("/:id/actions", get(documents::allowed_actions))
        .route("/:id/issue", post(documents::issue_document))
        .route("/:id/void", post(documents::void_document))
        .route("/:id/duplicate", post(documents::duplicate_document))
        .route("/:id/payments", post(documents::record_payment))
        .route("/:id/allocations", post(documents::allocate))
        .route("/:id/allocations", get(documents::list_allocations))
        .route("/:id/refunds", post(documents::refund));

    // Payment routes (read side; payments are recorded per document)
    let payment_routes = Router::new()
        .route("/", get(payments::list_payments))
        .route("/:id", get(payments::get_payment));

    // Report routes
    let report_routes = Router::new()
        .route("/trial-balance", get(reports::trial_balance_report))
        .route("/income-statement", get(reports::income_statement_report))
        .route("/balance-sheet", get(reports::balance_sheet_report));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/journal-entries", journal_routes)
        .nest("/documents/:kind", document_routes)
        .nest("/payments", payment_routes)
        .nest("/reports", report_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
