mod common;

use common::{date, engine_at, seed_account_and_card, FlakyStore};

use ledger_core::errors::EngineError;
use ledger_core::ledger::cycle::RecurrenceInterval;
use ledger_core::ledger::entry::{Entry, EntryKind, SplitMode};
use ledger_core::storage::{DocumentStore, EntryFilter};
use ledger_core::time::FixedClock;
use ledger_core::LedgerEngine;

#[test]
fn installment_sum_matches_requested_total_across_counts() {
    for count in [1u32, 2, 3, 12, 72] {
        let engine = engine_at(date(2025, 6, 1));
        let (_, card) = seed_account_and_card(&engine);
        let template = Entry::new(EntryKind::Expense, 99_999, "furniture", date(2025, 7, 5))
            .with_card(card.id);

        let members = engine
            .expand_series(template, RecurrenceInterval::Monthly, count, SplitMode::Installment)
            .expect("expansion succeeds");

        assert_eq!(members.len(), count as usize);
        assert_eq!(
            members.iter().map(|m| m.amount_cents).sum::<i64>(),
            99_999,
            "count {count}"
        );
        let share = members[0].amount_cents;
        assert!(members[..members.len() - 1]
            .iter()
            .all(|m| m.amount_cents == share));
    }
}

#[test]
fn fixed_mode_repeats_the_full_amount_each_occurrence() {
    let engine = engine_at(date(2025, 6, 1));
    let (account, _) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 4_500, "rent", date(2025, 7, 1))
        .with_account(account.id);

    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 6, SplitMode::Fixed)
        .unwrap();

    assert!(members.iter().all(|m| m.amount_cents == 4_500));
    assert_eq!(
        members.iter().map(|m| m.amount_cents).sum::<i64>(),
        4_500 * 6
    );
}

#[test]
fn weekly_series_steps_seven_days_at_a_time() {
    let engine = engine_at(date(2025, 6, 1));
    let (account, _) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 2_000, "class", date(2025, 6, 2))
        .with_account(account.id);

    let members = engine
        .expand_series(template, RecurrenceInterval::Weekly, 4, SplitMode::Fixed)
        .unwrap();
    let dates: Vec<_> = members.iter().map(|m| m.occurs_on).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 6, 2),
            date(2025, 6, 9),
            date(2025, 6, 16),
            date(2025, 6, 23)
        ]
    );
}

#[test]
fn truncating_from_index_eight_removes_the_five_member_tail() {
    let engine = engine_at(date(2025, 6, 1));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 120_000, "laptop", date(2025, 7, 5))
        .with_card(card.id);
    let members = engine
        .expand_series(template, RecurrenceInterval::Monthly, 12, SplitMode::Installment)
        .unwrap();
    let series_id = members[0].series_id.unwrap();

    let removed = engine.delete_from_installment(series_id, 8).unwrap();
    assert_eq!(removed, 5);

    let survivors = engine
        .list_entries(&EntryFilter::by_series(series_id))
        .unwrap();
    assert_eq!(survivors.len(), 7);
    for (i, member) in survivors.iter().enumerate() {
        assert_eq!(member.installment_index, Some(i as u32 + 1));
    }
}

#[test]
fn partial_write_failure_reports_achieved_count_and_keeps_survivors() {
    let store = FlakyStore::failing_after(7);
    let engine = LedgerEngine::new(Box::new(store), Box::new(FixedClock(date(2025, 6, 1))));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 120_000, "laptop", date(2025, 7, 5))
        .with_card(card.id);

    let err = engine
        .expand_series(template, RecurrenceInterval::Monthly, 12, SplitMode::Installment)
        .expect_err("write outage must surface");

    match err {
        EngineError::PartialFailure { completed, total, .. } => {
            assert_eq!(completed, 7);
            assert_eq!(total, 12);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }

    let written = engine.store().entries(&EntryFilter::default()).unwrap();
    assert_eq!(written.len(), 7);
}

#[test]
fn expansion_without_interval_is_rejected_before_any_write() {
    let engine = engine_at(date(2025, 6, 1));
    let (_, card) = seed_account_and_card(&engine);
    let template = Entry::new(EntryKind::Expense, 9_000, "noop", date(2025, 7, 5))
        .with_card(card.id);

    let err = engine
        .expand_series(template, RecurrenceInterval::None, 3, SplitMode::Installment)
        .expect_err("missing interval must fail");
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine
        .store()
        .entries(&EntryFilter::default())
        .unwrap()
        .is_empty());
}
