//! Integration tests for the allocation engine

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DocumentId, Money, PartyId};
use domain_ledger::Ledger;
use domain_documents::{
    Allocatable, AllocationTarget, DocumentError, DocumentKind, DocumentRegistry, Phase,
};
use test_utils::{
    assert_conservation, assert_ledger_balanced, split_strategy, IdFixtures, LedgerFixtures,
    TestDocumentBuilder,
};

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Ledger, DocumentRegistry) {
    let ledger = LedgerFixtures::standard_ledger();
    let registry = LedgerFixtures::standard_registry(&ledger);
    (ledger, registry)
}

fn issued(
    ledger: &mut Ledger,
    registry: &mut DocumentRegistry,
    kind: DocumentKind,
    party: PartyId,
    amount: Decimal,
) -> DocumentId {
    let doc = TestDocumentBuilder::new(kind)
        .with_party(party)
        .with_date(date(2026, 6, 1))
        .with_total(amount)
        .build();
    let id = registry.create_document(doc).unwrap();
    registry.issue(ledger, &id, "tester").unwrap();
    id
}

#[test]
fn debit_note_allocation_scenario() {
    let (mut ledger, mut registry) = setup();
    let vendor = PartyId::new();

    let note = issued(&mut ledger, &mut registry, DocumentKind::DebitNote, vendor, dec!(200.00));
    let bill = issued(&mut ledger, &mut registry, DocumentKind::Bill, vendor, dec!(150.00));

    registry
        .allocate(&note, &[AllocationTarget { document_id: bill, amount: usd(dec!(150.00)) }])
        .unwrap();

    let note_doc = registry.get(&note).unwrap();
    assert_eq!(note_doc.phase, Phase::Partial);
    assert_eq!(note_doc.remaining_balance().amount(), dec!(50.00));
    assert_conservation(note_doc);
    assert_eq!(registry.get(&bill).unwrap().phase, Phase::Settled);
    assert_ledger_balanced(&ledger);

    // Only 50.00 remains on the note, so a 100.00 allocation must fail
    let second_bill =
        issued(&mut ledger, &mut registry, DocumentKind::Bill, vendor, dec!(100.00));
    let result = registry.allocate(
        &note,
        &[AllocationTarget { document_id: second_bill, amount: usd(dec!(100.00)) }],
    );
    assert!(matches!(result, Err(DocumentError::InsufficientSourceBalance { .. })));

    // The failed call committed nothing
    assert_eq!(registry.get(&note).unwrap().remaining_balance().amount(), dec!(50.00));
    assert_eq!(
        registry.get(&second_bill).unwrap().remaining_balance().amount(),
        dec!(100.00)
    );
}

#[test]
fn credit_note_spreads_across_invoices() {
    let (mut ledger, mut registry) = setup();
    let customer = PartyId::new();

    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(100.00));
    let inv_a = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(60.00));
    let inv_b = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(70.00));

    registry
        .allocate(
            &note,
            &[
                AllocationTarget { document_id: inv_a, amount: usd(dec!(60.00)) },
                AllocationTarget { document_id: inv_b, amount: usd(dec!(40.00)) },
            ],
        )
        .unwrap();

    assert_eq!(registry.get(&note).unwrap().phase, Phase::Settled);
    assert_eq!(registry.get(&inv_a).unwrap().phase, Phase::Settled);
    let b = registry.get(&inv_b).unwrap();
    assert_eq!(b.phase, Phase::Partial);
    assert_eq!(b.remaining_balance().amount(), dec!(30.00));
}

#[test]
fn party_mismatch_names_the_target() {
    let (mut ledger, mut registry) = setup();
    let customer = IdFixtures::party_id();
    let other = IdFixtures::other_party_id();

    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(50.00));
    let foreign = issued(&mut ledger, &mut registry, DocumentKind::Invoice, other, dec!(50.00));

    let result = registry.allocate(
        &note,
        &[AllocationTarget { document_id: foreign, amount: usd(dec!(50.00)) }],
    );
    match result {
        Err(DocumentError::InvalidPartyMismatch { target, .. }) => {
            assert_eq!(target, foreign.to_string());
        }
        other => panic!("expected party mismatch, got {other:?}"),
    }
}

#[test]
fn target_over_allocation_is_atomic() {
    let (mut ledger, mut registry) = setup();
    let customer = PartyId::new();

    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(100.00));
    let inv_a = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(60.00));
    let inv_b = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(20.00));

    // Second target over-allocates; the first must not commit either
    let result = registry.allocate(
        &note,
        &[
            AllocationTarget { document_id: inv_a, amount: usd(dec!(50.00)) },
            AllocationTarget { document_id: inv_b, amount: usd(dec!(30.00)) },
        ],
    );
    match result {
        Err(DocumentError::TargetOverAllocation { target, .. }) => {
            assert_eq!(target, inv_b.to_string());
        }
        other => panic!("expected over-allocation, got {other:?}"),
    }
    assert_eq!(registry.get(&note).unwrap().remaining_balance().amount(), dec!(100.00));
    assert_eq!(registry.get(&inv_a).unwrap().remaining_balance().amount(), dec!(60.00));
}

#[test]
fn repeated_target_in_one_call_cannot_over_allocate() {
    let (mut ledger, mut registry) = setup();
    let customer = PartyId::new();

    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(200.00));
    let invoice =
        issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(100.00));

    // 60 + 60 against the same invoice exceeds its 100.00 balance even
    // though each request fits on its own
    let result = registry.allocate(
        &note,
        &[
            AllocationTarget { document_id: invoice, amount: usd(dec!(60.00)) },
            AllocationTarget { document_id: invoice, amount: usd(dec!(60.00)) },
        ],
    );
    match result {
        Err(DocumentError::TargetOverAllocation { target, requested, .. }) => {
            assert_eq!(target, invoice.to_string());
            assert_eq!(requested, "USD 120.00");
        }
        other => panic!("expected over-allocation, got {other:?}"),
    }

    // Nothing committed on either side
    assert_eq!(registry.get(&note).unwrap().remaining_balance().amount(), dec!(200.00));
    let inv = registry.get(&invoice).unwrap();
    assert_eq!(inv.remaining_balance().amount(), dec!(100.00));
    assert_conservation(inv);

    // A repeated target that fits in aggregate still goes through
    registry
        .allocate(
            &note,
            &[
                AllocationTarget { document_id: invoice, amount: usd(dec!(60.00)) },
                AllocationTarget { document_id: invoice, amount: usd(dec!(40.00)) },
            ],
        )
        .unwrap();
    assert_eq!(registry.get(&invoice).unwrap().phase, Phase::Settled);
    assert_eq!(registry.get(&note).unwrap().remaining_balance().amount(), dec!(100.00));
}

#[test]
fn empty_allocation_rejected() {
    let (mut ledger, mut registry) = setup();
    let customer = PartyId::new();
    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(50.00));

    assert!(matches!(
        registry.allocate(&note, &[]),
        Err(DocumentError::EmptyAllocation)
    ));
}

#[test]
fn cross_kind_target_rejected() {
    let (mut ledger, mut registry) = setup();
    let party = PartyId::new();
    let note = issued(&mut ledger, &mut registry, DocumentKind::CreditNote, party, dec!(50.00));
    let bill = issued(&mut ledger, &mut registry, DocumentKind::Bill, party, dec!(50.00));

    // Credit notes allocate to invoices, never bills
    let result = registry.allocate(
        &note,
        &[AllocationTarget { document_id: bill, amount: usd(dec!(50.00)) }],
    );
    assert!(matches!(result, Err(DocumentError::InvalidTarget { .. })));
}

#[test]
fn refund_consumes_remaining_without_touching_targets() {
    let (mut ledger, mut registry) = setup();
    let vendor = PartyId::new();

    let note = issued(&mut ledger, &mut registry, DocumentKind::DebitNote, vendor, dec!(200.00));
    let bill = issued(&mut ledger, &mut registry, DocumentKind::Bill, vendor, dec!(150.00));
    registry
        .allocate(&note, &[AllocationTarget { document_id: bill, amount: usd(dec!(150.00)) }])
        .unwrap();

    registry
        .refund(
            &mut ledger,
            &note,
            usd(dec!(50.00)),
            domain_documents::PaymentMethod::BankTransfer,
            date(2026, 6, 15),
            "tester",
        )
        .unwrap();

    let note_doc = registry.get(&note).unwrap();
    assert_eq!(note_doc.phase, Phase::Settled);
    assert!(note_doc.remaining_balance().is_zero());
    // Conservation holds after the refund
    assert_conservation(note_doc);
    // The bill's settlement is untouched
    assert_eq!(registry.get(&bill).unwrap().phase, Phase::Settled);
    assert_ledger_balanced(&ledger);
}

#[test]
fn voiding_source_restores_target_capacity() {
    let (mut ledger, mut registry) = setup();
    let customer = PartyId::new();

    let note =
        issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(40.00));
    let invoice =
        issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(40.00));
    registry
        .allocate(&note, &[AllocationTarget { document_id: invoice, amount: usd(dec!(40.00)) }])
        .unwrap();
    assert_eq!(registry.get(&invoice).unwrap().phase, Phase::Settled);

    registry
        .void_document(&mut ledger, &note, "issued in error", "tester")
        .unwrap();

    let inv = registry.get(&invoice).unwrap();
    assert_eq!(inv.phase, Phase::Issued);
    assert_eq!(inv.remaining_balance().amount(), dec!(40.00));
    assert_eq!(registry.get(&note).unwrap().phase, Phase::Void);
}

proptest! {
    /// No sequence of allocate calls ever pushes a source past its
    /// total, and conservation holds on every document afterwards.
    #[test]
    fn prop_no_over_allocation(requests in split_strategy(12)) {
        let (mut ledger, mut registry) = setup();
        let customer = PartyId::new();

        let note = issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(100.00));
        let mut committed = Decimal::ZERO;

        for cents in requests {
            let amount = Decimal::new(cents, 2);
            let invoice = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(1000.00));
            if registry
                .allocate(&note, &[AllocationTarget { document_id: invoice, amount: usd(amount) }])
                .is_ok()
            {
                committed += amount;
            }
        }

        prop_assert!(committed <= dec!(100.00));
        let doc = registry.get(&note).unwrap();
        prop_assert_eq!(doc.allocated.amount(), committed);
        prop_assert_eq!(doc.allocated + doc.remaining_balance(), doc.total_amount());
    }

    /// allocated + remaining == total on both sides after any single
    /// successful allocation.
    #[test]
    fn prop_allocation_conservation(cents in 1u32..10_000) {
        let (mut ledger, mut registry) = setup();
        let customer = PartyId::new();
        let amount = Decimal::new(cents as i64, 2);

        let note = issued(&mut ledger, &mut registry, DocumentKind::CreditNote, customer, dec!(100.00));
        let invoice = issued(&mut ledger, &mut registry, DocumentKind::Invoice, customer, dec!(100.00));

        registry
            .allocate(&note, &[AllocationTarget { document_id: invoice, amount: usd(amount) }])
            .unwrap();

        for id in [&note, &invoice] {
            let doc = registry.get(id).unwrap();
            prop_assert_eq!(doc.allocated + doc.remaining_balance(), doc.total_amount());
            prop_assert!(!doc.remaining_balance().is_negative());
        }
    }
}
