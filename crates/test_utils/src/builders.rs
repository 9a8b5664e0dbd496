//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the
//! rest.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, Currency, Money, PartyId, Rate};
use domain_documents::{Document, DocumentDiscount, DocumentKind, LineItem};
use domain_ledger::{EntryType, JournalEntry};

use crate::fixtures::{DateFixtures, IdFixtures};

/// Builder for test journal entries
pub struct TestEntryBuilder {
    entry_date: NaiveDate,
    entry_type: EntryType,
    description: String,
    lines: Vec<(AccountId, Decimal, Decimal)>,
    currency: Currency,
}

impl Default for TestEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEntryBuilder {
    pub fn new() -> Self {
        Self {
            entry_date: DateFixtures::posting_date(),
            entry_type: EntryType::Standard,
            description: "Test entry".to_string(),
            lines: Vec::new(),
            currency: Currency::USD,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = date;
        self
    }

    pub fn with_entry_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn debit(mut self, account: AccountId, amount: Decimal) -> Self {
        self.lines.push((account, amount, Decimal::ZERO));
        self
    }

    pub fn credit(mut self, account: AccountId, amount: Decimal) -> Self {
        self.lines.push((account, Decimal::ZERO, amount));
        self
    }

    /// A balanced two-line movement between `debit_account` and
    /// `credit_account`
    pub fn transfer(self, debit_account: AccountId, credit_account: AccountId, amount: Decimal) -> Self {
        self.debit(debit_account, amount).credit(credit_account, amount)
    }

    pub fn build(self) -> JournalEntry {
        let mut entry = JournalEntry::new(self.entry_date, self.entry_type, self.description);
        for (account, debit, credit) in self.lines {
            entry = if !debit.is_zero() {
                entry.debit(account, Money::new(debit, self.currency))
            } else {
                entry.credit(account, Money::new(credit, self.currency))
            };
        }
        entry
    }
}

/// Builder for test documents
pub struct TestDocumentBuilder {
    kind: DocumentKind,
    party_id: PartyId,
    document_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency: Currency,
    lines: Vec<LineItem>,
    discount: Option<DocumentDiscount>,
    reference: Option<String>,
}

impl Default for TestDocumentBuilder {
    fn default() -> Self {
        Self::new(DocumentKind::Invoice)
    }
}

impl TestDocumentBuilder {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            party_id: IdFixtures::party_id(),
            document_date: DateFixtures::posting_date(),
            due_date: None,
            currency: Currency::USD,
            lines: Vec::new(),
            discount: None,
            reference: None,
        }
    }

    pub fn invoice() -> Self {
        Self::new(DocumentKind::Invoice)
    }

    pub fn bill() -> Self {
        Self::new(DocumentKind::Bill)
    }

    pub fn credit_note() -> Self {
        Self::new(DocumentKind::CreditNote)
    }

    pub fn debit_note() -> Self {
        Self::new(DocumentKind::DebitNote)
    }

    pub fn with_party(mut self, party_id: PartyId) -> Self {
        self.party_id = party_id;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.document_date = date;
        self
    }

    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_discount(mut self, discount: DocumentDiscount) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_line(mut self, description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        self.lines.push(LineItem::new(
            description,
            quantity,
            Money::new(unit_price, self.currency),
        ));
        self
    }

    pub fn with_taxed_line(
        mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        tax_percent: Decimal,
    ) -> Self {
        self.lines.push(
            LineItem::new(description, quantity, Money::new(unit_price, self.currency))
                .with_tax(Rate::from_percentage(tax_percent)),
        );
        self
    }

    /// One plain line totaling the given amount
    pub fn with_total(self, amount: Decimal) -> Self {
        self.with_line("Test line", dec!(1), amount)
    }

    pub fn build(self) -> Document {
        let mut doc = Document::new(self.kind, self.party_id, self.document_date, self.currency);
        for line in self.lines {
            doc = doc.with_line(line);
        }
        if let Some(discount) = self.discount {
            doc = doc.with_discount(discount);
        }
        if let Some(due) = self.due_date {
            doc = doc.with_due_date(due);
        }
        if let Some(reference) = self.reference {
            doc = doc.with_reference(reference);
        }
        doc.refresh_totals();
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_documents::Phase;

    #[test]
    fn test_entry_builder_balances() {
        let a = AccountId::new();
        let b = AccountId::new();
        let entry = TestEntryBuilder::new().transfer(a, b, dec!(250.00)).build();

        assert_eq!(entry.lines.len(), 2);
        assert_eq!(
            entry.total_debits(Currency::USD).amount(),
            entry.total_credits(Currency::USD).amount()
        );
    }

    #[test]
    fn test_document_builder_defaults() {
        let doc = TestDocumentBuilder::invoice().with_total(dec!(500.00)).build();

        assert_eq!(doc.kind, DocumentKind::Invoice);
        assert_eq!(doc.phase, Phase::Draft);
        assert_eq!(doc.totals.total.amount(), dec!(500.00));
    }

    #[test]
    fn test_document_builder_tax() {
        let doc = TestDocumentBuilder::bill()
            .with_taxed_line("Supplies", dec!(2), dec!(50.00), dec!(10))
            .build();

        assert_eq!(doc.totals.subtotal.amount(), dec!(100.00));
        assert_eq!(doc.totals.tax.amount(), dec!(10.00));
        assert_eq!(doc.totals.total.amount(), dec!(110.00));
    }
}
