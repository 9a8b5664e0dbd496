//! Reporting projections
//!
//! Read-only views computed from the ledger: trial balance, per-account
//! ledger with running balance, income statement, and balance sheet.
//! Projections never mutate state and only see posted, non-void
//! entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{AccountId, JournalEntryId, Money};

use crate::account::{AccountFamily, BalanceSide};
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// One row of the trial balance
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceRow {
    pub account_id: AccountId,
    pub account_number: String,
    pub account_name: String,
    /// Balance shown on the account's normal side
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Trial balance as of report time
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub is_balanced: bool,
}

/// One movement in an account ledger
#[derive(Debug, Clone, Serialize)]
pub struct AccountLedgerRow {
    pub entry_id: JournalEntryId,
    pub entry_number: Option<String>,
    pub entry_date: NaiveDate,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub running_balance: Decimal,
}

/// Posted activity for one account, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct AccountLedger {
    pub account_id: AccountId,
    pub account_name: String,
    pub rows: Vec<AccountLedgerRow>,
    pub closing_balance: Decimal,
}

/// Income statement over a date range
#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatement {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: Vec<ReportLine>,
    pub expenses: Vec<ReportLine>,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

/// Balance sheet as of a date
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: Vec<ReportLine>,
    pub liabilities: Vec<ReportLine>,
    pub equity: Vec<ReportLine>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    /// Current-period earnings folded into the equity section
    pub net_income: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// One named amount on a financial statement
#[derive(Debug, Clone, Serialize)]
pub struct ReportLine {
    pub account_id: AccountId,
    pub account_number: String,
    pub account_name: String,
    pub amount: Decimal,
}

/// Builds the trial balance from current running balances. Rows are
/// sorted by account number; each balance lands in the column of the
/// account's normal side (negative balances flip to the other column).
pub fn trial_balance(ledger: &Ledger) -> TrialBalance {
    let mut rows: Vec<TrialBalanceRow> = ledger
        .accounts()
        .map(|account| {
            let balance = ledger
                .get_balance(&account.id())
                .map(|m| m.amount())
                .unwrap_or_default();
            let (debit, credit) = match account.normal_balance() {
                BalanceSide::Debit if balance >= Decimal::ZERO => (balance, Decimal::ZERO),
                BalanceSide::Debit => (Decimal::ZERO, -balance),
                BalanceSide::Credit if balance >= Decimal::ZERO => (Decimal::ZERO, balance),
                BalanceSide::Credit => (-balance, Decimal::ZERO),
            };
            TrialBalanceRow {
                account_id: account.id(),
                account_number: account.number().to_string(),
                account_name: account.name().to_string(),
                debit,
                credit,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));

    let total_debits: Decimal = rows.iter().map(|r| r.debit).sum();
    let total_credits: Decimal = rows.iter().map(|r| r.credit).sum();
    let epsilon = ledger.currency().minor_unit();

    TrialBalance {
        rows,
        total_debits,
        total_credits,
        is_balanced: (total_debits - total_credits).abs() <= epsilon,
    }
}

/// Builds the posted movement history of one account with a running
/// balance, oriented to the account's normal side
pub fn account_ledger(ledger: &Ledger, account_id: &AccountId) -> Result<AccountLedger, LedgerError> {
    let account = ledger
        .get_account(account_id)
        .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;
    let debit_normal = account.account_type().is_debit_normal();

    let mut running = Decimal::ZERO;
    let mut rows = Vec::new();
    for entry in ledger.entries().filter(|e| e.is_posted()) {
        for line in entry.lines.iter().filter(|l| &l.account_id == account_id) {
            let debit = line.debit.amount();
            let credit = line.credit.amount();
            running += if debit_normal { debit - credit } else { credit - debit };
            rows.push(AccountLedgerRow {
                entry_id: entry.id,
                entry_number: entry.entry_number.clone(),
                entry_date: entry.entry_date,
                description: entry.description.clone(),
                debit,
                credit,
                running_balance: running,
            });
        }
    }

    Ok(AccountLedger {
        account_id: *account_id,
        account_name: account.name().to_string(),
        rows,
        closing_balance: running,
    })
}

/// Builds the income statement for entries dated within `[from, to]`
pub fn income_statement(ledger: &Ledger, from: NaiveDate, to: NaiveDate) -> IncomeStatement {
    let mut income = Vec::new();
    let mut expenses = Vec::new();

    for account in ledger.accounts() {
        let family = account.family();
        if family != AccountFamily::Income && family != AccountFamily::Expense {
            continue;
        }

        let amount = period_activity(ledger, &account.id(), from, to);
        if amount == Decimal::ZERO {
            continue;
        }

        let line = ReportLine {
            account_id: account.id(),
            account_number: account.number().to_string(),
            account_name: account.name().to_string(),
            amount,
        };
        match family {
            AccountFamily::Income => income.push(line),
            _ => expenses.push(line),
        }
    }
    income.sort_by(|a, b| a.account_number.cmp(&b.account_number));
    expenses.sort_by(|a, b| a.account_number.cmp(&b.account_number));

    let total_income: Decimal = income.iter().map(|l| l.amount).sum();
    let total_expenses: Decimal = expenses.iter().map(|l| l.amount).sum();

    IncomeStatement {
        from,
        to,
        income,
        expenses,
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
    }
}

/// Builds the balance sheet as of `as_of`; all-time net income appears
/// in the equity section so the statement foots
pub fn balance_sheet(ledger: &Ledger, as_of: NaiveDate) -> BalanceSheet {
    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut equity = Vec::new();
    let mut net_income = Decimal::ZERO;

    let earliest = NaiveDate::MIN;
    for account in ledger.accounts() {
        let amount = period_activity(ledger, &account.id(), earliest, as_of);
        match account.family() {
            AccountFamily::Income => {
                net_income += amount;
                continue;
            }
            AccountFamily::Expense => {
                net_income -= amount;
                continue;
            }
            _ => {}
        }
        if amount == Decimal::ZERO {
            continue;
        }

        let line = ReportLine {
            account_id: account.id(),
            account_number: account.number().to_string(),
            account_name: account.name().to_string(),
            amount,
        };
        match account.family() {
            AccountFamily::Asset => assets.push(line),
            AccountFamily::Liability => liabilities.push(line),
            AccountFamily::Equity => equity.push(line),
            _ => {}
        }
    }
    assets.sort_by(|a, b| a.account_number.cmp(&b.account_number));
    liabilities.sort_by(|a, b| a.account_number.cmp(&b.account_number));
    equity.sort_by(|a, b| a.account_number.cmp(&b.account_number));

    let total_assets: Decimal = assets.iter().map(|l| l.amount).sum();
    let total_liabilities: Decimal = liabilities.iter().map(|l| l.amount).sum();
    let total_equity: Decimal = equity.iter().map(|l| l.amount).sum::<Decimal>() + net_income;

    BalanceSheet {
        as_of,
        assets,
        liabilities,
        equity,
        total_assets,
        total_liabilities,
        total_equity,
        net_income,
        generated_at: Utc::now(),
    }
}

/// Normal-side activity of one account for posted entries dated within
/// `[from, to]`
fn period_activity(ledger: &Ledger, account_id: &AccountId, from: NaiveDate, to: NaiveDate) -> Decimal {
    let debit_normal = ledger
        .get_account(account_id)
        .map(|a| a.account_type().is_debit_normal())
        .unwrap_or(true);

    ledger
        .entries()
        .filter(|e| e.is_posted() && e.entry_date >= from && e.entry_date <= to)
        .flat_map(|e| e.lines.iter())
        .filter(|l| &l.account_id == account_id)
        .map(|l| {
            if debit_normal {
                l.debit.amount() - l.credit.amount()
            } else {
                l.credit.amount() - l.debit.amount()
            }
        })
        .sum()
}

/// Convenience wrapper that returns the all-time net income as Money
pub fn net_income_to_date(ledger: &Ledger, as_of: NaiveDate) -> Money {
    let statement = income_statement(ledger, NaiveDate::MIN, as_of);
    Money::new(statement.net_income, ledger.currency())
}
