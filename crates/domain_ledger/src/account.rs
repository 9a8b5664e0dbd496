//! Account types for the chart of accounts
//!
//! Every account carries a subtype from a fixed set; the subtype
//! determines the account family and, through it, the normal balance
//! side. The normal side is derived, never stored, so it can never be
//! edited after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AccountId;

/// The side on which increases to an account are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceSide {
    Debit,
    Credit,
}

/// The five top-level account families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountFamily {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountFamily {
    /// Returns the normal balance side for this family
    pub fn normal_balance(&self) -> BalanceSide {
        match self {
            AccountFamily::Asset | AccountFamily::Expense => BalanceSide::Debit,
            AccountFamily::Liability | AccountFamily::Equity | AccountFamily::Income => {
                BalanceSide::Credit
            }
        }
    }
}

/// The fixed set of account subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    // Assets
    Cash,
    Bank,
    AccountsReceivable,
    TaxReceivable,
    FixedAsset,
    OtherAsset,
    // Liabilities
    AccountsPayable,
    TaxPayable,
    OtherLiability,
    // Equity
    OwnersEquity,
    RetainedEarnings,
    // Income
    Sales,
    OtherIncome,
    // Expenses
    CostOfGoodsSold,
    OperatingExpense,
    OtherExpense,
}

impl AccountType {
    /// Returns the family this subtype belongs to
    pub fn family(&self) -> AccountFamily {
        match self {
            AccountType::Cash
            | AccountType::Bank
            | AccountType::AccountsReceivable
            | AccountType::TaxReceivable
            | AccountType::FixedAsset
            | AccountType::OtherAsset => AccountFamily::Asset,

            AccountType::AccountsPayable
            | AccountType::TaxPayable
            | AccountType::OtherLiability => AccountFamily::Liability,

            AccountType::OwnersEquity | AccountType::RetainedEarnings => AccountFamily::Equity,

            AccountType::Sales | AccountType::OtherIncome => AccountFamily::Income,

            AccountType::CostOfGoodsSold
            | AccountType::OperatingExpense
            | AccountType::OtherExpense => AccountFamily::Expense,
        }
    }

    /// Returns true if this subtype has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        self.family().normal_balance() == BalanceSide::Debit
    }
}

/// An account in the chart of accounts
///
/// The subtype (and hence the normal balance side) is immutable after
/// creation; changing it would silently invert historical reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    id: AccountId,
    /// Display number (e.g., "1000")
    number: String,
    /// Account name
    name: String,
    /// Account subtype (immutable)
    account_type: AccountType,
    /// Description
    description: Option<String>,
    /// Whether account accepts new postings
    is_active: bool,
    /// Version for optimistic concurrency
    version: u32,
    /// Creation timestamp
    created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new active account
    pub fn new(
        id: AccountId,
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            name: name.into(),
            account_type,
            description: None,
            is_active: true,
            version: 1,
            created_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn family(&self) -> AccountFamily {
        self.account_type.family()
    }

    /// Returns the side on which increases are recorded
    pub fn normal_balance(&self) -> BalanceSide {
        self.account_type.family().normal_balance()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Renames the account
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.version += 1;
    }

    /// Deactivates the account; inactive accounts reject new postings
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.version += 1;
    }

    /// Reactivates the account
    pub fn activate(&mut self) {
        self.is_active = true;
        self.version += 1;
    }
}

/// A minimal standard chart of accounts for bootstrapping
pub struct StandardChartOfAccounts;

impl StandardChartOfAccounts {
    /// Creates the default accounts a fresh ledger starts with
    pub fn create_standard_accounts() -> Vec<Account> {
        vec![
            Account::new(AccountId::new(), "1000", "Cash", AccountType::Cash),
            Account::new(AccountId::new(), "1010", "Bank", AccountType::Bank),
            Account::new(
                AccountId::new(),
                "1100",
                "Accounts Receivable",
                AccountType::AccountsReceivable,
            ),
            Account::new(
                AccountId::new(),
                "1200",
                "Tax Receivable",
                AccountType::TaxReceivable,
            ),
            Account::new(
                AccountId::new(),
                "2000",
                "Accounts Payable",
                AccountType::AccountsPayable,
            ),
            Account::new(AccountId::new(), "2100", "Tax Payable", AccountType::TaxPayable),
            Account::new(
                AccountId::new(),
                "3000",
                "Retained Earnings",
                AccountType::RetainedEarnings,
            ),
            Account::new(AccountId::new(), "4000", "Sales Revenue", AccountType::Sales),
            Account::new(AccountId::new(), "4100", "Other Income", AccountType::OtherIncome),
            Account::new(
                AccountId::new(),
                "5000",
                "Cost of Goods Sold",
                AccountType::CostOfGoodsSold,
            ),
            Account::new(
                AccountId::new(),
                "5100",
                "Operating Expense",
                AccountType::OperatingExpense,
            ),
        ]
    }
}
