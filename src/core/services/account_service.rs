//! Balance reconciliation for accounts.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::EngineResult;
use crate::ledger::entry::{Entry, EntryKind, EntryStatus};
use crate::storage::{DocumentStore, EntryFilter};

/// Recomputes and adjusts cached account balances from completed entries.
pub struct AccountService;

impl AccountService {
    /// Derives the account balance from scratch: initial balance plus every
    /// completed entry's signed effect. Pending and cancelled entries are
    /// ignored.
    pub fn recompute_balance(store: &dyn DocumentStore, account_id: Uuid) -> EngineResult<i64> {
        let account = store.account(account_id)?;
        let entries = store.entries(&EntryFilter::default())?;
        let movement: i64 = entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Completed)
            .map(|entry| entry.balance_effect_on(account_id))
            .sum();
        Ok(account.initial_balance_cents + movement)
    }

    /// Recomputes the balance and writes it back to the cached field.
    pub fn refresh_balance(store: &dyn DocumentStore, account_id: Uuid) -> EngineResult<i64> {
        let balance = Self::recompute_balance(store, account_id)?;
        let mut account = store.account(account_id)?;
        account.balance_cents = balance;
        store.upsert_account(&account)?;
        Ok(balance)
    }

    /// Reconciles drift by recording one synthetic completed entry for the
    /// difference and pinning the cached balance to the requested value. The
    /// cache is set directly rather than replayed through the synthetic
    /// entry, so repeated adjustments cannot accumulate drift.
    pub fn adjust(
        store: &dyn DocumentStore,
        today: NaiveDate,
        account_id: Uuid,
        new_balance_cents: i64,
    ) -> EngineResult<Option<Entry>> {
        let current = Self::recompute_balance(store, account_id)?;
        let delta = new_balance_cents - current;
        let mut account = store.account(account_id)?;

        if delta == 0 {
            account.balance_cents = new_balance_cents;
            store.upsert_account(&account)?;
            return Ok(None);
        }

        let kind = if delta > 0 {
            EntryKind::Income
        } else {
            EntryKind::Expense
        };
        let adjustment = Entry::new(kind, delta.abs(), "Balance adjustment", today)
            .with_account(account_id)
            .with_status(EntryStatus::Completed);
        store.insert_entry(&adjustment)?;

        account.balance_cents = new_balance_cents;
        store.upsert_account(&account)?;
        tracing::info!(
            "adjusted account {} by {} cents to {}",
            account_id,
            delta,
            new_balance_cents
        );
        Ok(Some(adjustment))
    }

    /// Applies one entry's completed contribution to the cached balances of
    /// the accounts it touches. `sign` is +1 when the contribution enters
    /// the ledger and -1 when it leaves. No-op for non-completed entries.
    pub(crate) fn apply_entry_to_caches(
        store: &dyn DocumentStore,
        entry: &Entry,
        sign: i64,
    ) -> EngineResult<()> {
        if entry.status != EntryStatus::Completed {
            return Ok(());
        }
        let mut touched = vec![];
        if let Some(account_id) = entry.account_id {
            touched.push(account_id);
        }
        if let Some(destination) = entry.destination_account_id {
            if Some(destination) != entry.account_id {
                touched.push(destination);
            }
        }
        for account_id in touched {
            let effect = entry.balance_effect_on(account_id);
            if effect == 0 {
                continue;
            }
            let mut account = store.account(account_id)?;
            account.balance_cents += sign * effect;
            store.upsert_account(&account)?;
        }
        Ok(())
    }
}
