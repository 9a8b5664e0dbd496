//! Ledger domain
//!
//! The double-entry core: chart of accounts, journal posting engine,
//! and read-only reporting projections. Documents and allocations live
//! in `domain_documents` and post into this crate's `Ledger`.

pub mod account;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod reporting;

pub use account::{Account, AccountFamily, AccountType, BalanceSide, StandardChartOfAccounts};
pub use entry::{
    month_end, AutoReversal, EntryLine, EntryStatus, EntryType, JournalEntry, Recurrence,
    RecurrenceFrequency,
};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use reporting::{
    account_ledger, balance_sheet, income_statement, net_income_to_date, trial_balance,
    AccountLedger, BalanceSheet, IncomeStatement, TrialBalance,
};
