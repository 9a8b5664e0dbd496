//! Payments and refunds
//!
//! A payment is a first-class cash event that allocates against a
//! single invoice or bill. A refund is a cash event against a note
//! that consumes remaining balance without touching any other
//! document's allocations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, JournalEntryId, Money, PartyId, PaymentId, RefundId};

use crate::document::Allocatable;

/// How funds moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    Cheque,
    Other,
}

/// A recorded payment against an invoice or bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub party_id: PartyId,
    pub payment_date: NaiveDate,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    /// Value already applied to the target document
    pub allocated: Money,
    /// Cash entry posted when the payment was recorded
    pub journal_entry: Option<JournalEntryId>,
    /// The single invoice or bill this payment settles
    pub applied_to: Option<DocumentId>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        party_id: PartyId,
        payment_date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            party_id,
            payment_date,
            amount,
            method,
            reference: None,
            allocated: Money::zero(amount.currency()),
            journal_entry: None,
            applied_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

impl Allocatable for Payment {
    fn total_amount(&self) -> Money {
        self.amount
    }

    fn remaining_balance(&self) -> Money {
        self.amount - self.allocated
    }

    fn party_id(&self) -> PartyId {
        self.party_id
    }
}

/// A cash-out/cash-in event against a note's remaining balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub document_id: DocumentId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub refund_date: NaiveDate,
    /// Cash entry posted when the refund was recorded
    pub journal_entry: JournalEntryId,
    pub created_at: DateTime<Utc>,
}
