//! Business logic for single ledger entries: creation, status and amount
//! transitions, and deletion with derived-total reversal.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::AccountService;
use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::Displayable;
use crate::ledger::entry::{Entry, EntryStatus};
use crate::storage::{DocumentStore, EntryFilter};

/// Outcome of a status or amount transition. `goal_delta` is the signed
/// amount a goal-progress total tracking this entry must apply; cached
/// account balances are already updated when this is returned.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub entry: Entry,
    pub goal_delta: i64,
}

/// Validated CRUD helpers for individual entries.
pub struct EntryService;

impl EntryService {
    /// Persists a new entry. Card-funded entries get their bill period from
    /// the card's closing-day rule unless one was supplied; status is
    /// assigned once from the creation date.
    pub fn add(store: &dyn DocumentStore, today: NaiveDate, mut entry: Entry) -> EngineResult<Entry> {
        if let Some(card_id) = entry.card_id {
            let card = store.card(card_id)?;
            if entry.bill_period.is_none() {
                entry.bill_period = Some(card.billing_period_for(entry.occurs_on));
            }
        }
        if let Some(account_id) = entry.account_id {
            store.account(account_id)?;
        }
        if let Some(destination) = entry.destination_account_id {
            store.account(destination)?;
        }
        entry.validate()?;
        entry.status = EntryStatus::on_creation(entry.occurs_on, today);
        store.insert_entry(&entry)?;
        AccountService::apply_entry_to_caches(store, &entry, 1)?;
        tracing::debug!("persisted {}", entry.display_label());
        Ok(entry)
    }

    /// Moves an entry between statuses, updating cached balances and
    /// returning the goal-progress delta. No-op transitions net zero.
    pub fn set_status(
        store: &dyn DocumentStore,
        id: Uuid,
        new_status: EntryStatus,
    ) -> EngineResult<StatusChange> {
        let mut entry = store.entry(id)?;
        let goal_delta = EntryStatus::transition_delta(
            entry.status,
            entry.amount_cents,
            new_status,
            entry.amount_cents,
        );
        AccountService::apply_entry_to_caches(store, &entry, -1)?;
        entry.status = new_status;
        store.update_entry(&entry)?;
        AccountService::apply_entry_to_caches(store, &entry, 1)?;
        Ok(StatusChange { entry, goal_delta })
    }

    /// Edits an entry's amount, updating cached balances and returning the
    /// goal-progress delta (old subtracted, new added while completed).
    pub fn set_amount(
        store: &dyn DocumentStore,
        id: Uuid,
        new_amount_cents: i64,
    ) -> EngineResult<StatusChange> {
        if new_amount_cents <= 0 {
            return Err(EngineError::Validation(format!(
                "entry amount must be positive, got {new_amount_cents}"
            )));
        }
        let mut entry = store.entry(id)?;
        let goal_delta = EntryStatus::transition_delta(
            entry.status,
            entry.amount_cents,
            entry.status,
            new_amount_cents,
        );
        AccountService::apply_entry_to_caches(store, &entry, -1)?;
        entry.amount_cents = new_amount_cents;
        store.update_entry(&entry)?;
        AccountService::apply_entry_to_caches(store, &entry, 1)?;
        Ok(StatusChange { entry, goal_delta })
    }

    /// Deletes an entry, reversing the balance contribution it had already
    /// made. Discount entries linked to the deleted one fall with it. All
    /// removed entries are returned so the caller can report them.
    pub fn remove(store: &dyn DocumentStore, id: Uuid) -> EngineResult<Vec<Entry>> {
        let entry = store.entry(id)?;
        let dependents: Vec<Entry> = store
            .entries(&EntryFilter::default())?
            .into_iter()
            .filter(|candidate| candidate.related_entry_id == Some(id))
            .collect();

        let mut removed = Vec::with_capacity(dependents.len() + 1);
        for dependent in dependents {
            let gone = store.remove_entry(dependent.id)?;
            AccountService::apply_entry_to_caches(store, &gone, -1)?;
            removed.push(gone);
        }
        let gone = store.remove_entry(entry.id)?;
        AccountService::apply_entry_to_caches(store, &gone, -1)?;
        removed.push(gone);
        Ok(removed)
    }

    /// Ordinary ledger listing. Settlement entries are projections of a bill
    /// payment and stay hidden here so they are not rendered twice.
    pub fn list(store: &dyn DocumentStore, filter: &EntryFilter) -> EngineResult<Vec<Entry>> {
        Ok(store
            .entries(filter)?
            .into_iter()
            .filter(|entry| !entry.is_settlement())
            .collect())
    }
}
