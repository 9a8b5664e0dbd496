//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_documents::{Allocatable, Document, Phase};
use domain_ledger::{trial_balance, JournalEntry, Ledger};

/// Asserts that two Money values are equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more
/// than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.amount(),
        money.currency()
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.amount(),
        money.currency()
    );
}

/// Asserts that a journal entry's debits equal its credits within the
/// currency's minor unit
pub fn assert_entry_balanced(entry: &JournalEntry, currency: Currency) {
    let debits = entry.total_debits(currency);
    let credits = entry.total_credits(currency);
    let diff = (debits.amount() - credits.amount()).abs();
    assert!(
        diff <= currency.minor_unit(),
        "Entry {} is unbalanced: debits={}, credits={}",
        entry.id,
        debits.amount(),
        credits.amount()
    );
}

/// Asserts that the ledger's trial balance foots
pub fn assert_ledger_balanced(ledger: &Ledger) {
    let tb = trial_balance(ledger);
    assert!(
        tb.is_balanced,
        "Trial balance does not foot: debits={}, credits={}",
        tb.total_debits, tb.total_credits
    );
}

/// Asserts a document's lifecycle phase
pub fn assert_phase(document: &Document, expected: Phase) {
    assert_eq!(
        document.phase, expected,
        "Document {} is {} ({}), expected {}",
        document.id,
        document.phase,
        document.status_label(),
        expected
    );
}

/// Asserts allocation conservation: allocated + remaining == total
pub fn assert_conservation(document: &Document) {
    let sum = document.allocated + document.remaining_balance();
    assert_eq!(
        sum.amount(),
        document.totals.total.amount(),
        "Allocated {} + remaining {} != total {} for document {}",
        document.allocated.amount(),
        document.remaining_balance().amount(),
        document.totals.total.amount(),
        document.id
    );
}
