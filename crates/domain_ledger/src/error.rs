//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account exists but rejects postings
    #[error("Account is inactive: {0}")]
    AccountInactive(String),

    /// Account already exists
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Account display number already taken
    #[error("Account number already in use: {0}")]
    DuplicateAccountNumber(String),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Entry sequence number already taken
    #[error("Entry number already in use: {0}")]
    DuplicateEntryNumber(String),

    /// Debits and credits do not balance
    #[error("Unbalanced entry: debits={debits}, credits={credits}, difference={difference}")]
    Unbalanced {
        debits: Decimal,
        credits: Decimal,
        difference: Decimal,
    },

    /// Entry has no lines
    #[error("Entry must have at least one line")]
    NoLines,

    /// A line has both or neither of debit/credit set
    #[error("Invalid line for account {account}: {reason}")]
    InvalidLine { account: String, reason: String },

    /// Action not permitted in the entry's current status
    #[error("Cannot {action} entry in {status} status")]
    InvalidStatus { action: String, status: String },

    /// Stale version on concurrent mutation; caller should retry
    #[error("Version conflict on {entity}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: String,
        expected: u32,
        actual: u32,
    },

    /// Calculation error
    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl LedgerError {
    pub fn invalid_status(action: impl Into<String>, status: impl std::fmt::Debug) -> Self {
        LedgerError::InvalidStatus {
            action: action.into(),
            status: format!("{:?}", status),
        }
    }
}
