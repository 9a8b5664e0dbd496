//! Per-kind document numbering
//!
//! Each document kind keeps its own monotonically increasing,
//! zero-padded sequence ("INV-0001", "DN-0001"). Callers may supply an
//! explicit number; collisions are rejected, never silently renumbered.

use std::collections::{HashMap, HashSet};

use crate::document::DocumentKind;
use crate::error::DocumentError;

/// Tracks taken numbers and the next candidate per document kind
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    taken: HashSet<String>,
    next: HashMap<DocumentKind, u64>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number the next issued document of this kind would
    /// receive, without reserving it
    pub fn peek(&self, kind: DocumentKind) -> String {
        let mut seq = self.next.get(&kind).copied().unwrap_or(1);
        loop {
            let candidate = format!("{}-{:04}", kind.prefix(), seq);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            seq += 1;
        }
    }

    /// Reserves and returns the next free number for this kind
    pub fn reserve(&mut self, kind: DocumentKind) -> String {
        loop {
            let seq = self.next.entry(kind).or_insert(1);
            let candidate = format!("{}-{:04}", kind.prefix(), *seq);
            *seq += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Claims an explicit caller-supplied number
    pub fn claim(&mut self, number: &str) -> Result<(), DocumentError> {
        if !self.taken.insert(number.to_string()) {
            return Err(DocumentError::DuplicateDocumentNumber(number.to_string()));
        }
        Ok(())
    }

    /// Releases a number when a draft holding it is deleted
    pub fn release(&mut self, number: &str) {
        self.taken.remove(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_independent_per_kind() {
        let mut seq = SequenceRegistry::new();
        assert_eq!(seq.reserve(DocumentKind::Invoice), "INV-0001");
        assert_eq!(seq.reserve(DocumentKind::Invoice), "INV-0002");
        assert_eq!(seq.reserve(DocumentKind::DebitNote), "DN-0001");
        assert_eq!(seq.reserve(DocumentKind::Bill), "BILL-0001");
    }

    #[test]
    fn test_peek_does_not_reserve() {
        let mut seq = SequenceRegistry::new();
        assert_eq!(seq.peek(DocumentKind::CreditNote), "CN-0001");
        assert_eq!(seq.peek(DocumentKind::CreditNote), "CN-0001");
        assert_eq!(seq.reserve(DocumentKind::CreditNote), "CN-0001");
        assert_eq!(seq.peek(DocumentKind::CreditNote), "CN-0002");
    }

    #[test]
    fn test_explicit_number_collision_rejected() {
        let mut seq = SequenceRegistry::new();
        seq.claim("INV-0007").unwrap();
        assert!(matches!(
            seq.claim("INV-0007"),
            Err(DocumentError::DuplicateDocumentNumber(_))
        ));
    }

    #[test]
    fn test_reserve_skips_claimed_numbers() {
        let mut seq = SequenceRegistry::new();
        seq.claim("INV-0001").unwrap();
        assert_eq!(seq.reserve(DocumentKind::Invoice), "INV-0002");
    }

    #[test]
    fn test_release_frees_number() {
        let mut seq = SequenceRegistry::new();
        seq.claim("BILL-0009").unwrap();
        seq.release("BILL-0009");
        assert!(seq.claim("BILL-0009").is_ok());
    }
}
