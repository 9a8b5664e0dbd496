//! Document DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Currency, Money, Rate};
use domain_documents::{
    Allocatable, Allocation, AllocationParty, AllowedActions, Document, DocumentDiscount,
    DocumentKind, KindSummary, LineItem, Payment, PaymentMethod, Phase,
};

#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
}

impl LineItemRequest {
    pub fn into_line(self, currency: Currency) -> LineItem {
        let mut line = LineItem::new(
            self.description,
            self.quantity,
            Money::new(self.unit_price, currency),
        );
        if let Some(pct) = self.discount_percent {
            line = line.with_discount(Rate::from_percentage(pct));
        }
        if let Some(pct) = self.tax_percent {
            line = line.with_tax(Rate::from_percentage(pct));
        }
        line
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub party_id: Uuid,
    pub document_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub lines: Vec<LineItemRequest>,
    #[serde(default)]
    pub discount: Option<DocumentDiscount>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub lines: Vec<LineItemRequest>,
    #[serde(default)]
    pub discount: Option<DocumentDiscount>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Version the caller last read; a mismatch rejects the update
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct VoidDocumentRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AllocationTargetRequest {
    pub target_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub targets: Vec<AllocationTargetRequest>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub amount: Decimal,
    pub refund_date: NaiveDate,
    pub method: PaymentMethod,
}

/// Listing query parameters
#[derive(Debug, Deserialize, Default)]
pub struct ListDocumentsQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub party_id: Option<Uuid>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub number: Option<String>,
    pub status: String,
    pub phase: Phase,
    pub party_id: Uuid,
    pub document_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub lines: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub allocated: Decimal,
    pub remaining_balance: Decimal,
    pub journal_entry_id: Option<Uuid>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: *doc.id.as_uuid(),
            kind: doc.kind,
            number: doc.number.clone(),
            status: doc.status_label().to_string(),
            phase: doc.phase,
            party_id: *doc.party_id.as_uuid(),
            document_date: doc.document_date,
            due_date: doc.due_date,
            reference: doc.reference.clone(),
            lines: doc
                .lines
                .iter()
                .map(|l| LineItemResponse {
                    id: l.id,
                    description: l.description.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price.amount(),
                    discount_percent: l.discount.map(|r| r.as_percentage()),
                    tax_percent: l.tax.map(|r| r.as_percentage()),
                })
                .collect(),
            subtotal: doc.totals.subtotal.amount(),
            discount: doc.totals.discount.amount(),
            tax: doc.totals.tax.amount(),
            total: doc.totals.total.amount(),
            allocated: doc.allocated.amount(),
            remaining_balance: doc.remaining_balance().amount(),
            journal_entry_id: doc.journal_entry.map(|id| *id.as_uuid()),
            version: doc.version,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub id: Uuid,
    pub source_type: String,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub amount: Decimal,
    pub applied_at: DateTime<Utc>,
}

impl AllocationResponse {
    pub fn from_allocation(allocation: &Allocation) -> Self {
        let (source_type, source_id) = match allocation.source {
            AllocationParty::Document(id) => ("DOCUMENT", *id.as_uuid()),
            AllocationParty::Payment(id) => ("PAYMENT", *id.as_uuid()),
        };
        Self {
            id: *allocation.id.as_uuid(),
            source_type: source_type.to_string(),
            source_id,
            target_id: *allocation.target.as_uuid(),
            amount: allocation.amount.amount(),
            applied_at: allocation.applied_at,
        }
    }
}

/// Materialized capability flags for one status value
#[derive(Debug, Serialize)]
pub struct CapabilityResponse {
    pub status: String,
    pub allow_edit: bool,
    pub allow_issue: bool,
    pub allow_apply: bool,
    pub allow_pay: bool,
    pub allow_refund: bool,
    pub allow_void: bool,
    pub allow_delete: bool,
    pub allow_reverse: bool,
    pub allow_duplicate: bool,
}

impl CapabilityResponse {
    pub fn new(status: String, actions: AllowedActions) -> Self {
        Self {
            status,
            allow_edit: actions.edit,
            allow_issue: actions.issue,
            allow_apply: actions.apply,
            allow_pay: actions.pay,
            allow_refund: actions.refund,
            allow_void: actions.void,
            allow_delete: actions.delete,
            allow_reverse: actions.reverse,
            allow_duplicate: actions.duplicate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub kind: DocumentKind,
    pub draft_count: usize,
    pub open_count: usize,
    pub settled_count: usize,
    pub void_count: usize,
    pub open_remaining: Decimal,
    pub overdue: Decimal,
}

impl SummaryResponse {
    pub fn from_summary(summary: &KindSummary) -> Self {
        Self {
            kind: summary.kind,
            draft_count: summary.draft_count,
            open_count: summary.open_count,
            settled_count: summary.settled_count,
            void_count: summary.void_count,
            open_remaining: summary.open_remaining.amount(),
            overdue: summary.overdue.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub party_id: Uuid,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub applied_to: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
}

impl PaymentResponse {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            party_id: *payment.party_id.as_uuid(),
            payment_date: payment.payment_date,
            amount: payment.amount.amount(),
            method: payment.method,
            reference: payment.reference.clone(),
            applied_to: payment.applied_to.map(|d| *d.as_uuid()),
            journal_entry_id: payment.journal_entry.map(|e| *e.as_uuid()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub refund_date: NaiveDate,
    pub journal_entry_id: Uuid,
}
