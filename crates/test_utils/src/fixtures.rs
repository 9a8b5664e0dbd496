//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the bookkeeping engine. Fixtures are
//! consistent and predictable so tests can assert exact values.

use chrono::NaiveDate;
use uuid::Uuid;

use core_kernel::{AccountId, Currency, PartyId};
use domain_documents::{ControlAccounts, DocumentRegistry};
use domain_ledger::{AccountType, Ledger, StandardChartOfAccounts};

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// Standard posting date inside the test period
    pub fn posting_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
    }

    /// Due date one month after the posting date
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 15).expect("valid date")
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Deterministic party ID
    pub fn party_id() -> PartyId {
        PartyId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").expect("valid uuid"),
        )
    }

    /// A second deterministic party, for mismatch tests
    pub fn other_party_id() -> PartyId {
        PartyId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").expect("valid uuid"),
        )
    }
}

/// Fixture for fully wired engine state
pub struct LedgerFixtures;

impl LedgerFixtures {
    /// A USD ledger seeded with the standard chart of accounts
    pub fn standard_ledger() -> Ledger {
        Self::ledger_with_currency(Currency::USD)
    }

    /// A seeded ledger in the given currency
    pub fn ledger_with_currency(currency: Currency) -> Ledger {
        let mut ledger = Ledger::new(currency);
        for account in StandardChartOfAccounts::create_standard_accounts() {
            ledger.add_account(account).expect("standard chart inserts");
        }
        ledger
    }

    /// A document registry wired to the ledger's control accounts
    pub fn standard_registry(ledger: &Ledger) -> DocumentRegistry {
        let controls = ControlAccounts::from_chart(ledger).expect("control accounts");
        DocumentRegistry::new(controls)
    }

    /// Looks up a standard-chart account by its subtype
    pub fn account_of_type(ledger: &Ledger, account_type: AccountType) -> AccountId {
        ledger
            .accounts()
            .find(|a| a.account_type() == account_type)
            .map(|a| a.id())
            .expect("standard chart account")
    }
}
