//! Series expansion and bulk series mutation. Every multi-entry operation
//! is a sequential loop of per-document writes; progress achieved before a
//! failing write is reported, never rolled back.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::AccountService;
use crate::errors::{EngineError, EngineResult};
use crate::ledger::cycle::{self, billing_period_for, BillPeriod, RecurrenceInterval};
use crate::ledger::entry::{Entry, SplitMode};
use crate::ledger::series::plan_series;
use crate::storage::{DocumentStore, EntryFilter};

/// Expands recurrence requests and mutates whole series.
pub struct SeriesService;

impl SeriesService {
    /// Expands the template into `count` persisted entries sharing one new
    /// series id. Failure at member k surfaces as a partial failure carrying
    /// `completed = k - 1`; the members already written stay in the store.
    pub fn expand(
        store: &dyn DocumentStore,
        today: NaiveDate,
        template: Entry,
        interval: RecurrenceInterval,
        count: u32,
        split_mode: SplitMode,
    ) -> EngineResult<Vec<Entry>> {
        let closing_day = match template.card_id {
            Some(card_id) => Some(store.card(card_id)?.closing_day),
            None => None,
        };
        if let Some(account_id) = template.account_id {
            store.account(account_id)?;
        }

        let plan = plan_series(&template, interval, count, split_mode, today, closing_day)?;
        let series_id = plan.series_id;
        let total = plan.entries.len();
        let mut created = Vec::with_capacity(total);
        for (i, member) in plan.entries.into_iter().enumerate() {
            if let Err(source) = store.insert_entry(&member) {
                tracing::warn!(
                    "series {} expansion stopped after {} of {} members",
                    series_id,
                    i,
                    total
                );
                return Err(EngineError::partial(i, total, source));
            }
            AccountService::apply_entry_to_caches(store, &member, 1)?;
            created.push(member);
        }
        Ok(created)
    }

    /// Shifts every member of a series by `delta_periods` calendar months,
    /// dates and bill periods alike. The shifted target of the earliest
    /// member must still be an assignable period; otherwise the whole
    /// operation is rejected before any write.
    pub fn shift(
        store: &dyn DocumentStore,
        today: NaiveDate,
        series_id: Uuid,
        delta_periods: i32,
    ) -> EngineResult<usize> {
        let members = store.entries(&EntryFilter::by_series(series_id))?;
        let Some(first) = members.first() else {
            return Err(EngineError::SeriesNotFound(series_id));
        };
        if delta_periods == 0 {
            return Ok(0);
        }

        let shifted_target = first.effective_period().shift(delta_periods);
        let floor = match first.card_id {
            Some(card_id) => {
                let card = store.card(card_id)?;
                billing_period_for(today, card.closing_day)
            }
            None => BillPeriod::containing(today),
        };
        if shifted_target < floor {
            return Err(EngineError::Precondition(format!(
                "series {series_id} cannot move into {shifted_target}; {floor} is the earliest open period"
            )));
        }

        let total = members.len();
        for (i, mut member) in members.into_iter().enumerate() {
            member.occurs_on = cycle::shift_month(member.occurs_on, delta_periods);
            member.bill_period = member.bill_period.map(|period| period.shift(delta_periods));
            if let Err(source) = store.update_entry(&member) {
                tracing::warn!(
                    "series {} shift stopped after {} of {} members",
                    series_id,
                    i,
                    total
                );
                return Err(EngineError::partial(i, total, source));
            }
        }
        Ok(total)
    }

    /// Deletes the series tail from `from_index` onward (1-based). Earlier
    /// installments are untouched. Returns the number removed; zero is a
    /// valid outcome when nothing matched.
    pub fn truncate(
        store: &dyn DocumentStore,
        series_id: Uuid,
        from_index: u32,
    ) -> EngineResult<usize> {
        if from_index == 0 {
            return Err(EngineError::Validation(
                "installment indices are 1-based".into(),
            ));
        }
        let doomed: Vec<Entry> = store
            .entries(&EntryFilter::by_series(series_id))?
            .into_iter()
            .filter(|member| {
                member
                    .installment_index
                    .map_or(false, |index| index >= from_index)
            })
            .collect();

        let total = doomed.len();
        let mut removed = 0usize;
        for member in doomed {
            match store.remove_entry(member.id) {
                Ok(gone) => {
                    AccountService::apply_entry_to_caches(store, &gone, -1)?;
                    removed += 1;
                }
                Err(source) => {
                    tracing::warn!(
                        "series {} truncation stopped after {} of {} members",
                        series_id,
                        removed,
                        total
                    );
                    return Err(EngineError::partial(removed, total, source));
                }
            }
        }
        Ok(removed)
    }
}
