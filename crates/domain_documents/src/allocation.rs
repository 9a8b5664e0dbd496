//! Allocation records
//!
//! An allocation links a source (credit note, debit note, or payment)
//! to a target (invoice or bill) with an amount. Records are immutable
//! once created; undoing one means voiding the owning document, which
//! detaches its allocations atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AllocationId, DocumentId, Money, PaymentId};

/// Either side of an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationParty {
    Document(DocumentId),
    Payment(PaymentId),
}

impl std::fmt::Display for AllocationParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationParty::Document(id) => write!(f, "{id}"),
            AllocationParty::Payment(id) => write!(f, "{id}"),
        }
    }
}

/// One target of an allocate call
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub document_id: DocumentId,
    pub amount: Money,
}

/// An immutable source-to-target value assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub source: AllocationParty,
    pub target: DocumentId,
    pub amount: Money,
    pub applied_at: DateTime<Utc>,
}

impl Allocation {
    pub fn new(source: AllocationParty, target: DocumentId, amount: Money) -> Self {
        Self {
            id: AllocationId::new_v7(),
            source,
            target,
            amount,
            applied_at: Utc::now(),
        }
    }

    /// True if the given document is either side of this allocation
    pub fn involves(&self, document_id: &DocumentId) -> bool {
        self.target == *document_id || self.source == AllocationParty::Document(*document_id)
    }
}
