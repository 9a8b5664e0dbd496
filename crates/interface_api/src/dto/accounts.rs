//! Account DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_ledger::{Account, AccountType, BalanceSide, Ledger};

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub number: String,
    pub name: String,
    pub account_type: AccountType,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub number: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: BalanceSide,
    pub balance: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl AccountResponse {
    pub fn from_account(account: &Account, ledger: &Ledger) -> Self {
        Self {
            id: *account.id().as_uuid(),
            number: account.number().to_string(),
            name: account.name().to_string(),
            account_type: account.account_type(),
            normal_balance: account.normal_balance(),
            balance: ledger
                .get_balance(&account.id())
                .map(|m| m.amount())
                .unwrap_or_default(),
            description: account.description().map(String::from),
            is_active: account.is_active(),
            version: account.version(),
            created_at: account.created_at(),
        }
    }
}
