//! Document registry
//!
//! Orchestrates the document lifecycle against the ledger: issuing
//! posts balanced journal lines through the posting engine, payments
//! and refunds post cash events, voiding detaches allocations and
//! reverses the issue posting. Every operation commits fully or
//! rejects without side effects.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{AccountId, DocumentId, Money, PartyId, PaymentId, RefundId};
use domain_ledger::{AccountType, EntryLine, EntryType, JournalEntry, Ledger};

use crate::allocation::{Allocation, AllocationParty, AllocationTarget};
use crate::document::{Allocatable, AllowedActions, Document, DocumentKind, Phase};
use crate::error::DocumentError;
use crate::line_item::{DocumentDiscount, LineItem};
use crate::payment::{Payment, PaymentMethod, Refund};
use crate::sequence::SequenceRegistry;

/// The ledger accounts document postings are derived against
#[derive(Debug, Clone, Copy)]
pub struct ControlAccounts {
    pub cash: AccountId,
    pub accounts_receivable: AccountId,
    pub accounts_payable: AccountId,
    pub sales_revenue: AccountId,
    pub purchase_expense: AccountId,
    pub tax_payable: AccountId,
    pub tax_receivable: AccountId,
}

impl ControlAccounts {
    /// Resolves control accounts from the chart by subtype
    pub fn from_chart(ledger: &Ledger) -> Result<Self, DocumentError> {
        let find = |subtype: AccountType, label: &str| {
            ledger
                .accounts()
                .find(|a| a.account_type() == subtype)
                .map(|a| a.id())
                .ok_or_else(|| DocumentError::ControlAccountMissing(label.to_string()))
        };
        Ok(Self {
            cash: find(AccountType::Cash, "cash")?,
            accounts_receivable: find(AccountType::AccountsReceivable, "accounts receivable")?,
            accounts_payable: find(AccountType::AccountsPayable, "accounts payable")?,
            sales_revenue: find(AccountType::Sales, "sales revenue")?,
            purchase_expense: find(AccountType::OperatingExpense, "purchase expense")?,
            tax_payable: find(AccountType::TaxPayable, "tax payable")?,
            tax_receivable: find(AccountType::TaxReceivable, "tax receivable")?,
        })
    }
}

/// Filter criteria for document listings
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub kind: Option<DocumentKind>,
    pub phase: Option<Phase>,
    pub party_id: Option<PartyId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Matched case-insensitively against number and reference
    pub search: Option<String>,
}

impl DocumentFilter {
    fn matches(&self, doc: &Document) -> bool {
        if self.kind.is_some_and(|k| k != doc.kind) {
            return false;
        }
        if self.phase.is_some_and(|p| p != doc.phase) {
            return false;
        }
        if self.party_id.is_some_and(|p| p != doc.party_id) {
            return false;
        }
        if self.from.is_some_and(|d| doc.document_date < d) {
            return false;
        }
        if self.to.is_some_and(|d| doc.document_date > d) {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let number_hit = doc
                .number
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&term));
            let reference_hit = doc
                .reference
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains(&term));
            if !number_hit && !reference_hit {
                return false;
            }
        }
        true
    }
}

/// Listing sort field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    DocumentDate,
    Number,
    Total,
    RemainingBalance,
}

/// One page of a filtered listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Per-status aggregate counts and totals for one document kind
#[derive(Debug, Clone)]
pub struct KindSummary {
    pub kind: DocumentKind,
    pub draft_count: usize,
    pub open_count: usize,
    pub settled_count: usize,
    pub void_count: usize,
    /// Sum of remaining balances across open documents
    pub open_remaining: Money,
    /// Remaining balance on open documents past their due date
    pub overdue: Money,
}

/// The document store and lifecycle engine
#[derive(Debug)]
pub struct DocumentRegistry {
    documents: HashMap<DocumentId, Document>,
    order: Vec<DocumentId>,
    payments: HashMap<PaymentId, Payment>,
    refunds: Vec<Refund>,
    allocations: Vec<Allocation>,
    sequences: SequenceRegistry,
    controls: ControlAccounts,
}

impl DocumentRegistry {
    pub fn new(controls: ControlAccounts) -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
            payments: HashMap::new(),
            refunds: Vec::new(),
            allocations: Vec::new(),
            sequences: SequenceRegistry::new(),
            controls,
        }
    }

    // ------------------------------------------------------------------
    // Draft lifecycle
    // ------------------------------------------------------------------

    /// Registers a new draft; an explicit number is claimed up front
    pub fn create_document(&mut self, mut document: Document) -> Result<DocumentId, DocumentError> {
        document.refresh_totals();
        if !document.is_draft() {
            return Err(DocumentError::invalid_phase(
                "create",
                document.kind,
                document.status_label(),
            ));
        }
        if let Some(number) = &document.number {
            self.sequences.claim(number)?;
        }

        let id = document.id;
        self.documents.insert(id, document);
        self.order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn get_payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.get(id)
    }

    /// All recorded payments, oldest first
    pub fn payments(&self) -> Vec<&Payment> {
        let mut payments: Vec<&Payment> = self.payments.values().collect();
        payments.sort_by_key(|p| p.created_at);
        payments
    }

    pub fn get_refund(&self, id: &RefundId) -> Option<&Refund> {
        self.refunds.iter().find(|r| r.id == *id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    pub fn allocations_for(&self, id: &DocumentId) -> Vec<&Allocation> {
        self.allocations.iter().filter(|a| a.involves(id)).collect()
    }

    /// Replaces a draft's editable content
    pub fn update_draft(
        &mut self,
        id: &DocumentId,
        lines: Vec<LineItem>,
        discount: Option<DocumentDiscount>,
        due_date: Option<NaiveDate>,
        reference: Option<String>,
    ) -> Result<(), DocumentError> {
        let doc = self.get_mut(id)?;
        if !doc.is_draft() {
            return Err(DocumentError::invalid_phase("edit", doc.kind, doc.status_label()));
        }

        doc.lines = lines;
        doc.discount = discount;
        doc.due_date = due_date;
        doc.reference = reference;
        doc.refresh_totals();
        doc.version += 1;
        doc.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Hard-deletes a draft with no allocations
    pub fn delete_draft(&mut self, id: &DocumentId) -> Result<(), DocumentError> {
        let doc = self.lookup(id)?;
        if !doc.allowed_actions().delete {
            return Err(DocumentError::invalid_phase("delete", doc.kind, doc.status_label()));
        }

        let number = doc.number.clone();
        if let Some(number) = number {
            self.sequences.release(&number);
        }
        self.documents.remove(id);
        self.order.retain(|d| d != id);
        info!(document = %id, "deleted draft document");
        Ok(())
    }

    /// Creates a fresh draft with the same lines and none of the
    /// status-derived fields
    pub fn duplicate(&mut self, id: &DocumentId) -> Result<DocumentId, DocumentError> {
        let doc = self.lookup(id)?;
        let mut copy = Document::new(doc.kind, doc.party_id, doc.document_date, doc.currency());
        copy.lines = doc
            .lines
            .iter()
            .map(|l| LineItem {
                id: uuid::Uuid::new_v4(),
                ..l.clone()
            })
            .collect();
        copy.discount = doc.discount;
        copy.due_date = doc.due_date;
        copy.reference = doc.reference.clone();
        self.create_document(copy)
    }

    // ------------------------------------------------------------------
    // Issue
    // ------------------------------------------------------------------

    /// Issues a draft: assigns a number if absent, posts the derived
    /// journal lines, and transitions to ISSUED. All-or-nothing.
    pub fn issue(
        &mut self,
        ledger: &mut Ledger,
        id: &DocumentId,
        actor: &str,
    ) -> Result<(), DocumentError> {
        let draft = self.lookup(id)?.clone();
        if !draft.is_draft() {
            return Err(DocumentError::invalid_phase("issue", draft.kind, draft.status_label()));
        }
        if draft.lines.is_empty() {
            return Err(DocumentError::NoLineItems);
        }
        for line in &draft.lines {
            line.validate()?;
        }

        let totals =
            crate::line_item::compute_totals(&draft.lines, draft.discount, draft.currency());
        let (number, reserved) = match draft.number.clone() {
            Some(number) => (number, false),
            None => (self.sequences.reserve(draft.kind), true),
        };

        let entry = self.issue_entry(&draft, &number, &totals);
        let entry_id = ledger.create_entry(entry)?;
        if let Err(e) = ledger.post(&entry_id, actor) {
            let _ = ledger.delete_draft(&entry_id);
            if reserved {
                self.sequences.release(&number);
            }
            return Err(e.into());
        }

        let doc = self.get_mut(id)?;
        doc.number = Some(number.clone());
        doc.issue(entry_id)?;
        info!(document = %id, number = %number, "issued document");
        Ok(())
    }

    /// Derives the balanced journal lines for issuing a document.
    /// Receivable documents move A/R against revenue and tax payable;
    /// payable documents move A/P against expense and tax receivable.
    /// Notes post the mirror image of their parent document kind.
    fn issue_entry(
        &self,
        doc: &Document,
        number: &str,
        totals: &crate::line_item::DocumentTotals,
    ) -> JournalEntry {
        let c = &self.controls;
        let net = totals.subtotal - totals.discount;
        let tax = totals.tax;
        let total = totals.total;

        let mut entry = JournalEntry::new(
            doc.document_date,
            EntryType::Standard,
            format!("{} {}", doc.kind, number),
        );

        let mut push = |line: EntryLine| {
            entry.lines.push(line);
        };
        match doc.kind {
            DocumentKind::Invoice => {
                push(EntryLine::debit(c.accounts_receivable, total));
                push(EntryLine::credit(c.sales_revenue, net));
                if tax.is_positive() {
                    push(EntryLine::credit(c.tax_payable, tax));
                }
            }
            DocumentKind::Bill => {
                push(EntryLine::debit(c.purchase_expense, net));
                if tax.is_positive() {
                    push(EntryLine::debit(c.tax_receivable, tax));
                }
                push(EntryLine::credit(c.accounts_payable, total));
            }
            DocumentKind::CreditNote => {
                push(EntryLine::debit(c.sales_revenue, net));
                if tax.is_positive() {
                    push(EntryLine::debit(c.tax_payable, tax));
                }
                push(EntryLine::credit(c.accounts_receivable, total));
            }
            DocumentKind::DebitNote => {
                push(EntryLine::debit(c.accounts_payable, total));
                push(EntryLine::credit(c.purchase_expense, net));
                if tax.is_positive() {
                    push(EntryLine::credit(c.tax_receivable, tax));
                }
            }
        }
        entry
    }

    // ------------------------------------------------------------------
    // Allocation engine
    // ------------------------------------------------------------------

    /// Applies value from a note to one or more invoices/bills.
    /// Targets are checked in caller order and the first violation is
    /// named; nothing commits unless every target passes.
    pub fn allocate(
        &mut self,
        source_id: &DocumentId,
        targets: &[AllocationTarget],
    ) -> Result<Vec<Allocation>, DocumentError> {
        let source = self.lookup(source_id)?;
        if !source.kind.is_note() {
            return Err(DocumentError::InvalidTarget {
                target: source_id.to_string(),
                reason: format!("a {} cannot be an allocation source", source.kind),
            });
        }
        if !source.is_open() {
            return Err(DocumentError::invalid_phase(
                "allocate from",
                source.kind,
                source.status_label(),
            ));
        }
        if targets.is_empty() || targets.iter().all(|t| !t.amount.is_positive()) {
            return Err(DocumentError::EmptyAllocation);
        }
        for target in targets {
            if !target.amount.is_positive() {
                return Err(DocumentError::InvalidAmount(format!(
                    "allocation amount for {} must be positive",
                    target.document_id
                )));
            }
        }

        let requested = targets
            .iter()
            .fold(Money::zero(source.currency()), |acc, t| acc + t.amount);
        if requested.amount() > source.remaining_balance().amount() {
            return Err(DocumentError::InsufficientSourceBalance {
                source_doc: source_id.to_string(),
                available: source.remaining_balance().to_string(),
                requested: requested.to_string(),
            });
        }

        // The same target may appear more than once in a call; the
        // over-allocation check runs against the summed request
        let mut requested_per_target: HashMap<DocumentId, Money> = HashMap::new();
        for t in targets {
            let sum = requested_per_target
                .entry(t.document_id)
                .or_insert_with(|| Money::zero(source.currency()));
            *sum = *sum + t.amount;
        }

        let expected_kind = source
            .kind
            .allocation_target()
            .unwrap_or(DocumentKind::Invoice);
        let source_party = source.party_id;

        // Validate every target before touching anything
        for t in targets {
            let target = self.lookup(&t.document_id)?;
            if target.kind != expected_kind {
                return Err(DocumentError::InvalidTarget {
                    target: t.document_id.to_string(),
                    reason: format!("expected a {}, found a {}", expected_kind, target.kind),
                });
            }
            if !target.is_open() {
                return Err(DocumentError::InvalidTarget {
                    target: t.document_id.to_string(),
                    reason: format!("target is {}", target.status_label()),
                });
            }
            if target.party_id != source_party {
                return Err(DocumentError::InvalidPartyMismatch {
                    source_party: source_party.to_string(),
                    target: t.document_id.to_string(),
                    target_party: target.party_id.to_string(),
                });
            }
            let requested_for_target = requested_per_target[&t.document_id];
            if requested_for_target.amount() > target.remaining_balance().amount() {
                return Err(DocumentError::TargetOverAllocation {
                    target: t.document_id.to_string(),
                    remaining: target.remaining_balance().to_string(),
                    requested: requested_for_target.to_string(),
                });
            }
        }

        // Commit
        let mut created = Vec::with_capacity(targets.len());
        for t in targets {
            let allocation =
                Allocation::new(AllocationParty::Document(*source_id), t.document_id, t.amount);
            self.documents
                .get_mut(&t.document_id)
                .expect("target validated above")
                .apply_allocation(t.amount);
            created.push(allocation.clone());
            self.allocations.push(allocation);
        }
        self.documents
            .get_mut(source_id)
            .expect("source validated above")
            .apply_allocation(requested);

        info!(source = %source_id, targets = targets.len(), "allocated document balance");
        Ok(created)
    }

    /// Records a payment against a single invoice or bill, posting the
    /// cash movement and allocating the full payment amount
    pub fn record_payment(
        &mut self,
        ledger: &mut Ledger,
        target_id: &DocumentId,
        payment_date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        actor: &str,
    ) -> Result<PaymentId, DocumentError> {
        let target = self.lookup(target_id)?;
        if target.kind.is_note() {
            return Err(DocumentError::InvalidTarget {
                target: target_id.to_string(),
                reason: format!("payments cannot target a {}", target.kind),
            });
        }
        if !target.is_open() {
            return Err(DocumentError::invalid_phase("pay", target.kind, target.status_label()));
        }
        if !amount.is_positive() {
            return Err(DocumentError::InvalidAmount(
                "payment amount must be positive".to_string(),
            ));
        }
        if amount.amount() > target.remaining_balance().amount() {
            return Err(DocumentError::TargetOverAllocation {
                target: target_id.to_string(),
                remaining: target.remaining_balance().to_string(),
                requested: amount.to_string(),
            });
        }

        let c = &self.controls;
        let number = target.number.as_deref().unwrap_or("document");
        let description = format!("Payment for {} {}", target.kind, number);
        // Receiving cash settles A/R; paying out settles A/P
        let entry = if target.kind.is_receivable() {
            JournalEntry::new(payment_date, EntryType::Standard, description)
                .debit(c.cash, amount)
                .credit(c.accounts_receivable, amount)
        } else {
            JournalEntry::new(payment_date, EntryType::Standard, description)
                .debit(c.accounts_payable, amount)
                .credit(c.cash, amount)
        };
        let party_id = target.party_id;
        let entry_id = ledger.create_entry(entry)?;
        if let Err(e) = ledger.post(&entry_id, actor) {
            let _ = ledger.delete_draft(&entry_id);
            return Err(e.into());
        }

        let mut payment = Payment::new(party_id, payment_date, amount, method);
        if let Some(reference) = reference {
            payment = payment.with_reference(reference);
        }
        payment.allocated = amount;
        payment.journal_entry = Some(entry_id);
        payment.applied_to = Some(*target_id);
        let payment_id = payment.id;

        self.allocations.push(Allocation::new(
            AllocationParty::Payment(payment_id),
            *target_id,
            amount,
        ));
        self.documents
            .get_mut(target_id)
            .expect("target validated above")
            .apply_allocation(amount);
        self.payments.insert(payment_id, payment);

        info!(payment = %payment_id, document = %target_id, "recorded payment");
        Ok(payment_id)
    }

    /// Pays out (or collects) a note's remaining balance as cash. The
    /// refunded amount settles into the note's allocated total; no
    /// other document is touched.
    pub fn refund(
        &mut self,
        ledger: &mut Ledger,
        id: &DocumentId,
        amount: Money,
        method: PaymentMethod,
        refund_date: NaiveDate,
        actor: &str,
    ) -> Result<RefundId, DocumentError> {
        let doc = self.lookup(id)?;
        if !doc.allowed_actions().refund {
            return Err(DocumentError::invalid_phase("refund", doc.kind, doc.status_label()));
        }
        if !amount.is_positive() {
            return Err(DocumentError::InvalidAmount(
                "refund amount must be positive".to_string(),
            ));
        }
        if amount.amount() > doc.remaining_balance().amount() {
            return Err(DocumentError::TargetOverAllocation {
                target: id.to_string(),
                remaining: doc.remaining_balance().to_string(),
                requested: amount.to_string(),
            });
        }

        let c = &self.controls;
        let number = doc.number.as_deref().unwrap_or("note");
        let description = format!("Refund of {} {}", doc.kind, number);
        // Credit note: cash out to the customer. Debit note: cash back
        // from the vendor.
        let entry = if doc.kind.is_receivable() {
            JournalEntry::new(refund_date, EntryType::Standard, description)
                .debit(c.accounts_receivable, amount)
                .credit(c.cash, amount)
        } else {
            JournalEntry::new(refund_date, EntryType::Standard, description)
                .debit(c.cash, amount)
                .credit(c.accounts_payable, amount)
        };
        let entry_id = ledger.create_entry(entry)?;
        if let Err(e) = ledger.post(&entry_id, actor) {
            let _ = ledger.delete_draft(&entry_id);
            return Err(e.into());
        }

        let refund = Refund {
            id: RefundId::new_v7(),
            document_id: *id,
            amount,
            method,
            refund_date,
            journal_entry: entry_id,
            created_at: chrono::Utc::now(),
        };
        let refund_id = refund.id;
        self.refunds.push(refund);
        self.get_mut(id)?.apply_allocation(amount);

        info!(refund = %refund_id, document = %id, "recorded refund");
        Ok(refund_id)
    }

    /// Removes every allocation the document is party to, restoring
    /// the counterpart's balances. Idempotent.
    pub fn detach_allocations(&mut self, id: &DocumentId) -> Result<(), DocumentError> {
        self.lookup(id)?;
        let detached: Vec<Allocation> = {
            let (gone, kept) = self.allocations.drain(..).partition(|a| a.involves(id));
            self.allocations = kept;
            gone
        };

        for allocation in &detached {
            // Restore the side that is not the detaching document
            if allocation.target != *id {
                if let Some(target) = self.documents.get_mut(&allocation.target) {
                    target.release_allocation(allocation.amount);
                }
            }
            match allocation.source {
                AllocationParty::Document(source_id) if source_id != *id => {
                    if let Some(source) = self.documents.get_mut(&source_id) {
                        source.release_allocation(allocation.amount);
                    }
                }
                AllocationParty::Payment(payment_id) => {
                    if let Some(payment) = self.payments.get_mut(&payment_id) {
                        payment.allocated = payment.allocated - allocation.amount;
                        payment.applied_to = None;
                    }
                }
                _ => {}
            }
            // The detaching document's own balance
            if let Some(doc) = self.documents.get_mut(id) {
                doc.release_allocation(allocation.amount);
            }
        }
        Ok(())
    }

    /// Voids a document: detaches allocations, reverses the issue
    /// posting, and marks the document void
    pub fn void_document(
        &mut self,
        ledger: &mut Ledger,
        id: &DocumentId,
        reason: impl Into<String>,
        actor: &str,
    ) -> Result<(), DocumentError> {
        let doc = self.lookup(id)?;
        if !doc.allowed_actions().void {
            return Err(DocumentError::invalid_phase("void", doc.kind, doc.status_label()));
        }
        let journal_entry = doc.journal_entry;

        self.detach_allocations(id)?;
        if let Some(entry_id) = journal_entry {
            let mirror = ledger.reverse(&entry_id)?;
            ledger.post(&mirror, actor)?;
        }
        self.get_mut(id)?.mark_void(reason)?;

        info!(document = %id, "voided document");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Capability set for one document
    pub fn allowed_actions(&self, id: &DocumentId) -> Result<AllowedActions, DocumentError> {
        Ok(self.lookup(id)?.allowed_actions())
    }

    /// Optimistic concurrency guard: a caller that read the document
    /// at version N passes N back with its mutation and is rejected
    /// if another writer got there first
    pub fn ensure_version(
        &self,
        id: &DocumentId,
        expected: Option<u32>,
    ) -> Result<(), DocumentError> {
        let doc = self.lookup(id)?;
        match expected {
            Some(expected) if expected != doc.version => Err(DocumentError::VersionConflict {
                entity: id.to_string(),
                expected,
                actual: doc.version,
            }),
            _ => Ok(()),
        }
    }

    /// The number the next issued document of this kind would receive
    pub fn next_number(&self, kind: DocumentKind) -> String {
        self.sequences.peek(kind)
    }

    /// Filtered, sorted, paginated listing. Page numbers are 1-based;
    /// limit 0 falls back to a sane default.
    pub fn list(
        &self,
        filter: &DocumentFilter,
        sort: SortField,
        descending: bool,
        page: usize,
        limit: usize,
    ) -> Page<Document> {
        let mut matched: Vec<&Document> =
            self.documents().filter(|d| filter.matches(d)).collect();
        matched.sort_by(|a, b| {
            let ord = match sort {
                SortField::DocumentDate => a.document_date.cmp(&b.document_date),
                SortField::Number => a.number.cmp(&b.number),
                SortField::Total => a.totals.total.amount().cmp(&b.totals.total.amount()),
                SortField::RemainingBalance => a
                    .remaining_balance()
                    .amount()
                    .cmp(&b.remaining_balance().amount()),
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let limit = if limit == 0 { 25 } else { limit };
        let page = page.max(1);
        let total = matched.len();
        let total_pages = total.div_ceil(limit).max(1);
        let items = matched
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();

        Page {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Aggregate counts and open balances for one kind
    pub fn summary(&self, kind: DocumentKind, as_of: NaiveDate, currency: core_kernel::Currency) -> KindSummary {
        let mut summary = KindSummary {
            kind,
            draft_count: 0,
            open_count: 0,
            settled_count: 0,
            void_count: 0,
            open_remaining: Money::zero(currency),
            overdue: Money::zero(currency),
        };

        for doc in self.documents().filter(|d| d.kind == kind) {
            match doc.phase {
                Phase::Draft => summary.draft_count += 1,
                Phase::Issued | Phase::Partial => {
                    summary.open_count += 1;
                    summary.open_remaining = summary.open_remaining + doc.remaining_balance();
                    if doc.due_date.is_some_and(|due| due < as_of) {
                        summary.overdue = summary.overdue + doc.remaining_balance();
                    }
                }
                Phase::Settled => summary.settled_count += 1,
                Phase::Void => summary.void_count += 1,
            }
        }
        summary
    }

    /// Materialized capability table: what each status label of a kind
    /// permits, independent of any particular document's amounts
    pub fn status_capabilities(&self, kind: DocumentKind) -> Vec<(String, AllowedActions)> {
        [Phase::Draft, Phase::Issued, Phase::Partial, Phase::Settled, Phase::Void]
            .into_iter()
            .map(|phase| {
                let open = matches!(phase, Phase::Issued | Phase::Partial);
                let actions = AllowedActions {
                    edit: phase == Phase::Draft,
                    issue: phase == Phase::Draft,
                    apply: open && kind.is_note(),
                    pay: open && !kind.is_note(),
                    refund: open && kind.is_note(),
                    void: !matches!(phase, Phase::Settled | Phase::Void),
                    delete: phase == Phase::Draft,
                    reverse: false,
                    duplicate: true,
                };
                (kind.status_label(phase).to_string(), actions)
            })
            .collect()
    }

    fn lookup(&self, id: &DocumentId) -> Result<&Document, DocumentError> {
        self.documents
            .get(id)
            .ok_or_else(|| DocumentError::DocumentNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &DocumentId) -> Result<&mut Document, DocumentError> {
        self.documents
            .get_mut(id)
            .ok_or_else(|| DocumentError::DocumentNotFound(id.to_string()))
    }
}
