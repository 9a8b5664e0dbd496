//! Allocatable documents and the shared lifecycle
//!
//! One phase machine serves all four document kinds. Each kind maps
//! its own status vocabulary onto the canonical phases, so transition
//! rules live here exactly once and callers query capabilities instead
//! of hard-coding transition tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, DocumentId, JournalEntryId, Money, PartyId};

use crate::error::DocumentError;
use crate::line_item::{compute_totals, DocumentDiscount, DocumentTotals, LineItem};

/// Canonical lifecycle phase shared by every document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Draft,
    Issued,
    Partial,
    Settled,
    Void,
}

impl Phase {
    /// Terminal phases admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Settled | Phase::Void)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Draft => "DRAFT",
            Phase::Issued => "ISSUED",
            Phase::Partial => "PARTIAL",
            Phase::Settled => "SETTLED",
            Phase::Void => "VOID",
        };
        write!(f, "{s}")
    }
}

/// The four allocatable document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Invoice,
    Bill,
    CreditNote,
    DebitNote,
}

impl DocumentKind {
    /// Sequence number prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Bill => "BILL",
            DocumentKind::CreditNote => "CN",
            DocumentKind::DebitNote => "DN",
        }
    }

    /// Notes allocate against invoices/bills; invoices and bills
    /// receive allocations and payments
    pub fn is_note(&self) -> bool {
        matches!(self, DocumentKind::CreditNote | DocumentKind::DebitNote)
    }

    /// The receivable side deals with customers, the payable side with
    /// vendors
    pub fn is_receivable(&self) -> bool {
        matches!(self, DocumentKind::Invoice | DocumentKind::CreditNote)
    }

    /// The kind a note of this kind allocates against
    pub fn allocation_target(&self) -> Option<DocumentKind> {
        match self {
            DocumentKind::CreditNote => Some(DocumentKind::Invoice),
            DocumentKind::DebitNote => Some(DocumentKind::Bill),
            _ => None,
        }
    }

    /// Kind-specific status label for a canonical phase. This is the
    /// per-kind vocabulary the console renders; transitions are always
    /// computed on the canonical phase.
    pub fn status_label(&self, phase: Phase) -> &'static str {
        match (self, phase) {
            (_, Phase::Draft) => "DRAFT",
            (_, Phase::Void) => "VOIDED",
            (DocumentKind::Invoice, Phase::Issued) => "SENT",
            (DocumentKind::Invoice, Phase::Partial) => "PARTIALLY_PAID",
            (DocumentKind::Invoice, Phase::Settled) => "PAID",
            (DocumentKind::Bill, Phase::Issued) => "OPEN",
            (DocumentKind::Bill, Phase::Partial) => "PARTIALLY_PAID",
            (DocumentKind::Bill, Phase::Settled) => "PAID",
            (DocumentKind::CreditNote | DocumentKind::DebitNote, Phase::Issued) => "OPEN",
            (DocumentKind::CreditNote | DocumentKind::DebitNote, Phase::Partial) => {
                "PARTIALLY_APPLIED"
            }
            (DocumentKind::CreditNote | DocumentKind::DebitNote, Phase::Settled) => "APPLIED",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Bill => "bill",
            DocumentKind::CreditNote => "credit note",
            DocumentKind::DebitNote => "debit note",
        };
        write!(f, "{s}")
    }
}

/// What a caller may do with a document right now. Derived purely from
/// phase and settlement amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedActions {
    pub edit: bool,
    pub issue: bool,
    pub apply: bool,
    pub pay: bool,
    pub refund: bool,
    pub void: bool,
    pub delete: bool,
    pub reverse: bool,
    pub duplicate: bool,
}

/// Capability interface the allocation engine is written against.
/// Documents and payments both implement it.
pub trait Allocatable {
    fn total_amount(&self) -> Money;
    fn remaining_balance(&self) -> Money;
    fn party_id(&self) -> PartyId;
}

/// An invoice, bill, credit note, or debit note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub kind: DocumentKind,
    /// Sequence number, assigned at issue or supplied by the caller
    pub number: Option<String>,
    pub party_id: PartyId,
    pub document_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub lines: Vec<LineItem>,
    pub discount: Option<DocumentDiscount>,
    pub reference: Option<String>,
    pub phase: Phase,
    /// Money breakdown, frozen at issue time
    pub totals: DocumentTotals,
    /// Amount already allocated, paid, or refunded
    pub allocated: Money,
    /// Ledger entry created when the document was issued
    pub journal_entry: Option<JournalEntryId>,
    pub issued_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a new draft document
    pub fn new(
        kind: DocumentKind,
        party_id: PartyId,
        document_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new_v7(),
            kind,
            number: None,
            party_id,
            document_date,
            due_date: None,
            lines: Vec::new(),
            discount: None,
            reference: None,
            phase: Phase::Draft,
            totals: DocumentTotals::zero(currency),
            allocated: Money::zero(currency),
            journal_entry: None,
            issued_at: None,
            voided_at: None,
            void_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_discount(mut self, discount: DocumentDiscount) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Recomputes the money breakdown from the current lines. Drafts
    /// only; totals freeze at issue.
    pub fn refresh_totals(&mut self) {
        if self.is_draft() {
            self.totals = compute_totals(&self.lines, self.discount, self.currency());
        }
    }

    pub fn currency(&self) -> Currency {
        self.allocated.currency()
    }

    /// Kind-specific status label for the current phase
    pub fn status_label(&self) -> &'static str {
        self.kind.status_label(self.phase)
    }

    pub fn is_draft(&self) -> bool {
        self.phase == Phase::Draft
    }

    /// True in any phase where allocations may be drawn or received
    pub fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Issued | Phase::Partial)
    }

    /// Validates lines and party, freezes totals, stamps the issue.
    /// Number assignment and ledger posting are the registry's job.
    pub fn issue(&mut self, journal_entry: JournalEntryId) -> Result<(), DocumentError> {
        if self.phase != Phase::Draft {
            return Err(DocumentError::invalid_phase("issue", self.kind, self.status_label()));
        }
        if self.lines.is_empty() {
            return Err(DocumentError::NoLineItems);
        }
        for line in &self.lines {
            line.validate()?;
        }

        self.totals = compute_totals(&self.lines, self.discount, self.currency());
        self.journal_entry = Some(journal_entry);
        self.issued_at = Some(Utc::now());
        // Zero-value documents have nothing left to settle
        self.phase = if self.totals.total.is_zero() {
            Phase::Settled
        } else {
            Phase::Issued
        };
        self.touch();
        Ok(())
    }

    /// Records allocated value against this document and recomputes
    /// the phase. The caller (the allocation engine) has already
    /// checked the remaining balance.
    pub fn apply_allocation(&mut self, amount: Money) {
        self.allocated = self.allocated + amount;
        self.recompute_phase();
        self.touch();
    }

    /// Returns allocated value, the inverse of `apply_allocation`
    pub fn release_allocation(&mut self, amount: Money) {
        self.allocated = self.allocated - amount;
        self.recompute_phase();
        self.touch();
    }

    /// Marks the document void. Allocation detachment and ledger
    /// reversal happen in the registry before this is called.
    pub fn mark_void(&mut self, reason: impl Into<String>) -> Result<(), DocumentError> {
        if matches!(self.phase, Phase::Settled | Phase::Void) {
            return Err(DocumentError::invalid_phase("void", self.kind, self.status_label()));
        }
        self.phase = Phase::Void;
        self.voided_at = Some(Utc::now());
        self.void_reason = Some(reason.into());
        self.touch();
        Ok(())
    }

    fn recompute_phase(&mut self) {
        if self.phase == Phase::Draft || self.phase == Phase::Void {
            return;
        }
        self.phase = if self.allocated.is_zero() {
            Phase::Issued
        } else if self.allocated.amount() < self.totals.total.amount() {
            Phase::Partial
        } else {
            Phase::Settled
        };
    }

    /// Derives the capability set from the current phase and amounts
    pub fn allowed_actions(&self) -> AllowedActions {
        let open = self.is_open();
        AllowedActions {
            edit: self.phase == Phase::Draft,
            issue: self.phase == Phase::Draft,
            apply: open && self.kind.is_note(),
            pay: open && !self.kind.is_note(),
            refund: open && self.kind.is_note() && self.remaining_balance().is_positive(),
            void: !matches!(self.phase, Phase::Settled | Phase::Void),
            delete: self.phase == Phase::Draft && self.allocated.is_zero(),
            reverse: false,
            duplicate: true,
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

impl Allocatable for Document {
    fn total_amount(&self) -> Money {
        self.totals.total
    }

    fn remaining_balance(&self) -> Money {
        self.totals.total - self.allocated
    }

    fn party_id(&self) -> PartyId {
        self.party_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_invoice() -> Document {
        Document::new(
            DocumentKind::Invoice,
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            Currency::USD,
        )
        .with_line(LineItem::new(
            "Consulting",
            dec!(1),
            Money::new(dec!(100.00), Currency::USD),
        ))
    }

    #[test]
    fn test_issue_freezes_totals_and_phase() {
        let mut doc = draft_invoice();
        doc.issue(JournalEntryId::new_v7()).unwrap();

        assert_eq!(doc.phase, Phase::Issued);
        assert_eq!(doc.totals.total.amount(), dec!(100.00));
        assert_eq!(doc.status_label(), "SENT");
        assert!(doc.issued_at.is_some());
    }

    #[test]
    fn test_issue_requires_lines() {
        let mut doc = Document::new(
            DocumentKind::Invoice,
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            Currency::USD,
        );
        assert!(matches!(
            doc.issue(JournalEntryId::new_v7()),
            Err(DocumentError::NoLineItems)
        ));
    }

    #[test]
    fn test_allocation_drives_phase() {
        let mut doc = draft_invoice();
        doc.issue(JournalEntryId::new_v7()).unwrap();

        doc.apply_allocation(Money::new(dec!(40.00), Currency::USD));
        assert_eq!(doc.phase, Phase::Partial);
        assert_eq!(doc.remaining_balance().amount(), dec!(60.00));

        doc.apply_allocation(Money::new(dec!(60.00), Currency::USD));
        assert_eq!(doc.phase, Phase::Settled);
        assert!(doc.remaining_balance().is_zero());

        doc.release_allocation(Money::new(dec!(100.00), Currency::USD));
        assert_eq!(doc.phase, Phase::Issued);
    }

    #[test]
    fn test_allocation_conservation() {
        let mut doc = draft_invoice();
        doc.issue(JournalEntryId::new_v7()).unwrap();
        doc.apply_allocation(Money::new(dec!(33.33), Currency::USD));

        let sum = doc.allocated + doc.remaining_balance();
        assert_eq!(sum, doc.total_amount());
    }

    #[test]
    fn test_capabilities_per_phase() {
        let mut doc = draft_invoice();
        let draft = doc.allowed_actions();
        assert!(draft.edit && draft.issue && draft.delete);
        assert!(!draft.pay && !draft.apply);

        doc.issue(JournalEntryId::new_v7()).unwrap();
        let issued = doc.allowed_actions();
        assert!(!issued.edit && !issued.issue && !issued.delete);
        assert!(issued.pay && issued.void);
        // Invoices pay, they do not apply or refund
        assert!(!issued.apply && !issued.refund);

        doc.apply_allocation(Money::new(dec!(100.00), Currency::USD));
        let settled = doc.allowed_actions();
        assert!(!settled.edit && !settled.issue && !settled.pay && !settled.void);
    }

    #[test]
    fn test_note_capabilities() {
        let mut note = Document::new(
            DocumentKind::CreditNote,
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            Currency::USD,
        )
        .with_line(LineItem::new(
            "Return",
            dec!(1),
            Money::new(dec!(50.00), Currency::USD),
        ));
        note.issue(JournalEntryId::new_v7()).unwrap();

        let actions = note.allowed_actions();
        assert!(actions.apply && actions.refund);
        assert!(!actions.pay);
        assert_eq!(note.status_label(), "OPEN");
    }

    #[test]
    fn test_void_from_partial_but_not_settled() {
        let mut doc = draft_invoice();
        doc.issue(JournalEntryId::new_v7()).unwrap();
        doc.apply_allocation(Money::new(dec!(10.00), Currency::USD));
        assert!(doc.mark_void("customer dispute").is_ok());

        let mut settled = draft_invoice();
        settled.issue(JournalEntryId::new_v7()).unwrap();
        settled.apply_allocation(Money::new(dec!(100.00), Currency::USD));
        assert!(settled.mark_void("too late").is_err());
    }

    #[test]
    fn test_status_vocabulary() {
        assert_eq!(DocumentKind::Invoice.status_label(Phase::Settled), "PAID");
        assert_eq!(DocumentKind::Bill.status_label(Phase::Issued), "OPEN");
        assert_eq!(DocumentKind::DebitNote.status_label(Phase::Partial), "PARTIALLY_APPLIED");
        assert_eq!(DocumentKind::CreditNote.status_label(Phase::Void), "VOIDED");
    }
}
