//! Reporting handlers
//!
//! Reports are pure projections over the posted ledger; the handlers
//! just pick date ranges and serialize the domain views as-is.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use domain_ledger::{
    balance_sheet, income_statement, trial_balance, BalanceSheet, IncomeStatement, TrialBalance,
};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Every account's posted balance on its normal side
pub async fn trial_balance_report(
    State(state): State<AppState>,
) -> Result<Json<TrialBalance>, ApiError> {
    let engine = state.engine.read().await;
    Ok(Json(trial_balance(&engine.ledger)))
}

/// Income and expense activity over a period
pub async fn income_statement_report(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<IncomeStatement>, ApiError> {
    let engine = state.engine.read().await;
    let from = query.from.unwrap_or(NaiveDate::MIN);
    let to = query.to.unwrap_or_else(|| chrono::Utc::now().date_naive());
    if from > to {
        return Err(ApiError::Validation(
            "`from` must not be after `to`".to_string(),
        ));
    }
    Ok(Json(income_statement(&engine.ledger, from, to)))
}

/// Assets, liabilities, and equity as of a date
pub async fn balance_sheet_report(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<BalanceSheet>, ApiError> {
    let engine = state.engine.read().await;
    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    Ok(Json(balance_sheet(&engine.ledger, as_of)))
}
