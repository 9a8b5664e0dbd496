//! Document domain
//!
//! Invoices, bills, credit notes, and debit notes share one lifecycle:
//! draft, issued, partially settled, settled, with a void branch from
//! any non-terminal phase. Issuing derives balanced journal lines and
//! posts them through `domain_ledger`; the allocation engine moves
//! value between documents without ever over-drawing either side.

pub mod allocation;
pub mod document;
pub mod error;
pub mod line_item;
pub mod payment;
pub mod registry;
pub mod sequence;

pub use allocation::{Allocation, AllocationParty, AllocationTarget};
pub use document::{Allocatable, AllowedActions, Document, DocumentKind, Phase};
pub use error::DocumentError;
pub use line_item::{compute_totals, DocumentDiscount, DocumentTotals, LineItem};
pub use payment::{Payment, PaymentMethod, Refund};
pub use registry::{
    ControlAccounts, DocumentFilter, DocumentRegistry, KindSummary, Page, SortField,
};
pub use sequence::SequenceRegistry;
