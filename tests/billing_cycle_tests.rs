mod common;

use common::{date, engine_at, seed_account_and_card};

use ledger_core::errors::EngineError;
use ledger_core::ledger::cycle::{BillPeriod, RecurrenceInterval};
use ledger_core::ledger::entry::{Entry, EntryKind, SplitMode};

#[test]
fn purchases_straddling_the_closing_day_land_in_adjacent_bills() {
    let engine = engine_at(date(2025, 3, 18));
    let (_, card) = seed_account_and_card(&engine);

    let before_cutover = engine
        .add_entry(
            Entry::new(EntryKind::Expense, 10_000, "early", date(2025, 3, 5)).with_card(card.id),
        )
        .unwrap();
    let after_cutover = engine
        .add_entry(
            Entry::new(EntryKind::Expense, 10_000, "late", date(2025, 3, 15)).with_card(card.id),
        )
        .unwrap();

    let march = BillPeriod::new(2025, 3).unwrap();
    let april = BillPeriod::new(2025, 4).unwrap();
    assert_eq!(before_cutover.bill_period, Some(march));
    assert_eq!(after_cutover.bill_period, Some(april));

    let march_bill = engine.bill_for(card.id, march).unwrap();
    let april_bill = engine.bill_for(card.id, april).unwrap();
    assert_eq!(march_bill.due_on, date(2025, 3, 20));
    assert_eq!(april_bill.due_on, date(2025, 4, 20));
    assert_eq!(march_bill.total_cents, 10_000);
    assert_eq!(april_bill.total_cents, 10_000);
}

#[test]
fn bill_totals_skip_cancelled_entries() {
    let engine = engine_at(date(2025, 3, 18));
    let (_, card) = seed_account_and_card(&engine);

    engine
        .add_entry(
            Entry::new(EntryKind::Expense, 10_000, "kept", date(2025, 3, 5)).with_card(card.id),
        )
        .unwrap();
    let doomed = engine
        .add_entry(
            Entry::new(EntryKind::Expense, 4_000, "refunded", date(2025, 3, 6)).with_card(card.id),
        )
        .unwrap();
    engine
        .update_entry_status(doomed.id, ledger_core::ledger::entry::EntryStatus::Cancelled)
        .unwrap();

    let bill = engine
        .bill_for(card.id, BillPeriod::new(2025, 3).unwrap())
        .unwrap();
    assert_eq!(bill.total_cents, 10_000);
    assert_eq!(bill.entries.len(), 2);
}

#[test]
fn anticipation_pulls_a_future_installment_into_the_open_bill() {
    let engine = engine_at(date(2025, 6, 5));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 60_000, "fridge", date(2025, 7, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 6, SplitMode::Installment)
        .unwrap();

    let pulled = &members[3];
    let original_period = pulled.bill_period.unwrap();
    let outcome = engine.anticipate(pulled.id, Some(750)).unwrap();

    let june = BillPeriod::new(2025, 6).unwrap();
    assert_eq!(outcome.entry.bill_period, Some(june));
    assert_eq!(outcome.entry.anticipated_from, Some(original_period));

    let june_bill = engine.bill_for(card.id, june).unwrap();
    let anticipated_total = outcome.entry.amount_cents + 750;
    assert_eq!(june_bill.total_cents, anticipated_total);

    let original_bill = engine.bill_for(card.id, original_period).unwrap();
    assert!(original_bill
        .entries
        .iter()
        .all(|entry| entry.id != pulled.id));
}

#[test]
fn anticipation_requires_a_strictly_future_bill() {
    let engine = engine_at(date(2025, 7, 5));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 60_000, "fridge", date(2025, 7, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 6, SplitMode::Installment)
        .unwrap();

    let err = engine
        .anticipate(members[0].id, None)
        .expect_err("current-bill member cannot be anticipated");
    assert!(matches!(err, EngineError::Precondition(_)));
}

#[test]
fn non_series_entries_cannot_be_anticipated() {
    let engine = engine_at(date(2025, 6, 5));
    let (_, card) = seed_account_and_card(&engine);
    let lone = engine
        .add_entry(
            Entry::new(EntryKind::Expense, 9_000, "single", date(2025, 8, 5)).with_card(card.id),
        )
        .unwrap();

    let err = engine
        .anticipate(lone.id, None)
        .expect_err("non-series entry must be rejected");
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn moving_a_series_forward_relocates_every_bill_period() {
    let engine = engine_at(date(2025, 6, 5));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 36_000, "course", date(2025, 7, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 3, SplitMode::Installment)
        .unwrap();
    let series_id = members[0].series_id.unwrap();

    let moved = engine.move_series(series_id, 2).unwrap();
    assert_eq!(moved, 3);

    let september = BillPeriod::new(2025, 9).unwrap();
    let bill = engine.bill_for(card.id, september).unwrap();
    assert_eq!(bill.entries.len(), 1);
    assert_eq!(bill.total_cents, 12_000);
}

#[test]
fn moving_a_series_into_a_closed_bill_is_rejected_whole() {
    let engine = engine_at(date(2025, 6, 15));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 36_000, "course", date(2025, 8, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 3, SplitMode::Installment)
        .unwrap();
    let series_id = members[0].series_id.unwrap();

    // today is past the June 10 cutover, so July is the earliest open bill
    let err = engine
        .move_series(series_id, -2)
        .expect_err("move into closed June bill must fail");
    assert!(matches!(err, EngineError::Precondition(_)));

    let august = engine
        .bill_for(card.id, BillPeriod::new(2025, 8).unwrap())
        .unwrap();
    assert_eq!(august.entries.len(), 1);
}

#[test]
fn moving_back_to_the_earliest_open_bill_is_allowed() {
    let engine = engine_at(date(2025, 6, 15));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 36_000, "course", date(2025, 8, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 3, SplitMode::Installment)
        .unwrap();
    let series_id = members[0].series_id.unwrap();

    let moved = engine.move_series(series_id, -1).unwrap();
    assert_eq!(moved, 3);
    let july = engine
        .bill_for(card.id, BillPeriod::new(2025, 7).unwrap())
        .unwrap();
    assert_eq!(july.entries.len(), 1);
}
