use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::cycle::{billing_period_for, step_occurrence, RecurrenceInterval};
use crate::ledger::entry::{Entry, EntryStatus, SplitMode};

/// The entries a single recurrence request expands into, ready to persist in
/// order.
#[derive(Debug, Clone)]
pub struct SeriesPlan {
    pub series_id: Uuid,
    pub entries: Vec<Entry>,
}

/// Divides a series total across `count` occurrences. The first `count - 1`
/// members carry the floored share; the last absorbs the remainder so the
/// sum always equals the total exactly.
pub fn split_amounts(total_cents: i64, count: u32) -> Vec<i64> {
    let count = count.max(1) as i64;
    let share = total_cents / count;
    let mut amounts = vec![share; count as usize];
    if let Some(last) = amounts.last_mut() {
        *last = total_cents - share * (count - 1);
    }
    amounts
}

/// Expands a base entry into the dated members of a new series.
///
/// The template's `amount_cents` is the stated total (divided in installment
/// mode, repeated in fixed mode) and its `occurs_on` is the first occurrence.
/// `closing_day` must be supplied for card-funded templates so each member
/// lands in the right bill.
pub fn plan_series(
    template: &Entry,
    interval: RecurrenceInterval,
    count: u32,
    split_mode: SplitMode,
    today: NaiveDate,
    closing_day: Option<u32>,
) -> EngineResult<SeriesPlan> {
    template.validate()?;
    if interval == RecurrenceInterval::None {
        return Err(EngineError::Validation(
            "series expansion requires a recurrence interval".into(),
        ));
    }
    if count == 0 {
        return Err(EngineError::Validation(
            "series expansion requires at least one occurrence".into(),
        ));
    }
    if template.is_card_funded() && closing_day.is_none() {
        return Err(EngineError::Validation(
            "card-funded series requires the card's closing day".into(),
        ));
    }

    let series_id = Uuid::new_v4();
    let amounts = match split_mode {
        SplitMode::Installment => split_amounts(template.amount_cents, count),
        SplitMode::Fixed => vec![template.amount_cents; count as usize],
    };

    let mut entries = Vec::with_capacity(count as usize);
    for (i, amount) in amounts.into_iter().enumerate() {
        let occurs_on = step_occurrence(template.occurs_on, interval, i as u32);
        let mut member = template.clone();
        member.id = Uuid::new_v4();
        member.amount_cents = amount;
        member.occurs_on = occurs_on;
        member.status = EntryStatus::on_creation(occurs_on, today);
        member.series_id = Some(series_id);
        member.installment_index = Some(i as u32 + 1);
        member.installment_count = Some(count);
        member.recurrence_interval = interval;
        member.split_mode = split_mode;
        member.bill_period = closing_day.map(|day| billing_period_for(occurs_on, day));
        entries.push(member);
    }

    Ok(SeriesPlan { series_id, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::EntryKind;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card_template(amount: i64) -> Entry {
        Entry::new(EntryKind::Expense, amount, "subscription", date(2025, 3, 5))
            .with_card(Uuid::new_v4())
    }

    #[test]
    fn installment_split_sums_to_total_exactly() {
        for count in [1u32, 2, 3, 12, 72] {
            let amounts = split_amounts(10_000, count);
            assert_eq!(amounts.len(), count as usize);
            assert_eq!(amounts.iter().sum::<i64>(), 10_000, "count {count}");
        }
        assert_eq!(split_amounts(100, 3), vec![33, 33, 34]);
    }

    #[test]
    fn fixed_mode_repeats_full_amount() {
        let plan = plan_series(
            &card_template(2_500),
            RecurrenceInterval::Monthly,
            6,
            SplitMode::Fixed,
            date(2025, 1, 1),
            Some(10),
        )
        .unwrap();
        assert!(plan.entries.iter().all(|e| e.amount_cents == 2_500));
        assert_eq!(
            plan.entries.iter().map(|e| e.amount_cents).sum::<i64>(),
            2_500 * 6
        );
    }

    #[test]
    fn members_share_series_id_and_are_indexed_from_one() {
        let plan = plan_series(
            &card_template(1_200),
            RecurrenceInterval::Monthly,
            12,
            SplitMode::Installment,
            date(2025, 1, 1),
            Some(10),
        )
        .unwrap();
        for (i, member) in plan.entries.iter().enumerate() {
            assert_eq!(member.series_id, Some(plan.series_id));
            assert_eq!(member.installment_index, Some(i as u32 + 1));
            assert_eq!(member.installment_count, Some(12));
        }
    }

    #[test]
    fn status_is_assigned_from_creation_date_once() {
        let today = date(2025, 4, 10);
        let plan = plan_series(
            &card_template(900),
            RecurrenceInterval::Monthly,
            3,
            SplitMode::Installment,
            today,
            Some(10),
        )
        .unwrap();
        assert_eq!(plan.entries[0].status, EntryStatus::Completed);
        assert_eq!(plan.entries[1].status, EntryStatus::Completed);
        assert_eq!(plan.entries[2].status, EntryStatus::Pending);
    }

    #[test]
    fn card_members_land_in_their_cutover_period() {
        let mut template = card_template(600);
        template.occurs_on = date(2025, 3, 15);
        let plan = plan_series(
            &template,
            RecurrenceInterval::Monthly,
            2,
            SplitMode::Installment,
            date(2025, 1, 1),
            Some(10),
        )
        .unwrap();
        assert_eq!(
            plan.entries[0].bill_period,
            Some(crate::ledger::cycle::BillPeriod::new(2025, 4).unwrap())
        );
        assert_eq!(
            plan.entries[1].bill_period,
            Some(crate::ledger::cycle::BillPeriod::new(2025, 5).unwrap())
        );
    }

    #[test]
    fn expansion_rejects_missing_interval() {
        let err = plan_series(
            &card_template(600),
            RecurrenceInterval::None,
            2,
            SplitMode::Fixed,
            date(2025, 1, 1),
            Some(10),
        )
        .expect_err("interval none must be rejected");
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
