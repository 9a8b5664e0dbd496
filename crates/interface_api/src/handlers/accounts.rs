//! Account registry handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::AccountId;
use domain_ledger::{account_ledger, Account, AccountLedger};

use crate::dto::accounts::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a new account in the chart of accounts
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    if request.number.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Account number and name are required".to_string(),
        ));
    }

    let mut engine = state.engine.write().await;
    let mut account = Account::new(
        AccountId::new(),
        request.number,
        request.name,
        request.account_type,
    );
    if let Some(description) = request.description {
        account = account.with_description(description);
    }

    let id = engine.ledger.add_account(account)?;
    let account = engine
        .ledger
        .get_account(&id)
        .ok_or_else(|| ApiError::Internal("Account vanished after insert".to_string()))?;
    Ok(Json(AccountResponse::from_account(account, &engine.ledger)))
}

/// Lists all accounts, sorted by display number
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let engine = state.engine.read().await;
    let mut accounts: Vec<AccountResponse> = engine
        .ledger
        .accounts()
        .map(|a| AccountResponse::from_account(a, &engine.ledger))
        .collect();
    accounts.sort_by(|a, b| a.number.cmp(&b.number));
    Ok(Json(accounts))
}

/// Gets an account by ID
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, ApiError> {
    let engine = state.engine.read().await;
    let account_id = AccountId::from(id);
    let account = engine
        .ledger
        .get_account(&account_id)
        .ok_or_else(|| ApiError::NotFound(format!("Account not found: {account_id}")))?;
    Ok(Json(AccountResponse::from_account(account, &engine.ledger)))
}

/// Renames or (de)activates an account
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let account_id = AccountId::from(id);

    if let Some(name) = request.name {
        engine.ledger.rename_account(&account_id, name)?;
    }
    if let Some(active) = request.is_active {
        engine.ledger.set_account_active(&account_id, active)?;
    }

    let account = engine
        .ledger
        .get_account(&account_id)
        .ok_or_else(|| ApiError::NotFound(format!("Account not found: {account_id}")))?;
    Ok(Json(AccountResponse::from_account(account, &engine.ledger)))
}

/// Posted movement history with a running balance
pub async fn get_account_ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountLedger>, ApiError> {
    let engine = state.engine.read().await;
    let ledger_view = account_ledger(&engine.ledger, &AccountId::from(id))?;
    Ok(Json(ledger_view))
}
