//! Document domain errors

use thiserror::Error;

use domain_ledger::LedgerError;

/// Errors that can occur in the document domain
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Document sequence number already taken
    #[error("Document number already in use: {0}")]
    DuplicateDocumentNumber(String),

    /// Action not permitted in the document's current phase
    #[error("Cannot {action} {kind} in {phase} phase")]
    InvalidPhase {
        action: String,
        kind: String,
        phase: String,
    },

    /// Document has no line items
    #[error("Document must have at least one line item")]
    NoLineItems,

    /// A line item fails validation
    #[error("Invalid line item '{description}': {reason}")]
    InvalidLineItem { description: String, reason: String },

    /// Allocation request carried no targets
    #[error("Allocation must name at least one target")]
    EmptyAllocation,

    /// Source does not have enough unallocated balance for the request
    #[error(
        "Insufficient source balance: {source_doc} has {available} remaining, {requested} requested"
    )]
    InsufficientSourceBalance {
        source_doc: String,
        available: String,
        requested: String,
    },

    /// A target would be pushed past its remaining balance
    #[error("Allocation of {requested} exceeds remaining balance {remaining} on {target}")]
    TargetOverAllocation {
        target: String,
        remaining: String,
        requested: String,
    },

    /// Source and target belong to different parties
    #[error("Party mismatch: source belongs to {source_party}, target {target} to {target_party}")]
    InvalidPartyMismatch {
        source_party: String,
        target: String,
        target_party: String,
    },

    /// An allocation target is the wrong document kind or phase
    #[error("Invalid allocation target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Amount fails validation
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A control account required for posting is missing from the chart
    #[error("Control account not configured: {0}")]
    ControlAccountMissing(String),

    /// Stale version on concurrent mutation; caller should retry
    #[error("Version conflict on {entity}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: String,
        expected: u32,
        actual: u32,
    },

    /// Underlying ledger rejected a posting
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl DocumentError {
    pub fn invalid_phase(
        action: impl Into<String>,
        kind: impl std::fmt::Display,
        phase: impl std::fmt::Display,
    ) -> Self {
        DocumentError::InvalidPhase {
            action: action.into(),
            kind: kind.to_string(),
            phase: phase.to_string(),
        }
    }
}
