//! Core Kernel - Foundational types for the bookkeeping engine
//!
//! This crate provides the building blocks shared by all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Common error types

pub mod error;
pub mod identifiers;
pub mod money;

pub use error::CoreError;
pub use identifiers::{
    AccountId, AllocationId, DocumentId, JournalEntryId, PartyId, PaymentId, RefundId,
};
pub use money::{Currency, Money, MoneyError, Rate};
