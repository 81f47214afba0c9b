use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::Identifiable;
use crate::ledger::entry::Entry;
use crate::ledger::{Account, Card, MonthlyGoal};
use crate::storage::{DocumentStore, EntryFilter};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Uuid, Entry>,
    cards: HashMap<Uuid, Card>,
    accounts: HashMap<Uuid, Account>,
    goals: HashMap<Uuid, MonthlyGoal>,
}

/// In-memory reference backend. Per-document writes behind one mutex; the
/// engine still treats every call as an independent remote write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked<T>(&self, f: impl FnOnce(&mut Inner) -> EngineResult<T>) -> EngineResult<T> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| EngineError::Storage("memory store poisoned".into()))?;
        f(&mut inner)
    }
}

fn upsert<T: Identifiable>(map: &mut HashMap<Uuid, T>, value: &T) -> EngineResult<()>
where
    T: Clone,
{
    map.insert(value.id(), value.clone());
    Ok(())
}

impl DocumentStore for MemoryStore {
    fn insert_entry(&self, entry: &Entry) -> EngineResult<()> {
        self.locked(|inner| {
            if inner.entries.contains_key(&entry.id) {
                return Err(EngineError::Validation(format!(
                    "entry {} already exists",
                    entry.id
                )));
            }
            inner.entries.insert(entry.id, entry.clone());
            Ok(())
        })
    }

    fn update_entry(&self, entry: &Entry) -> EngineResult<()> {
        self.locked(|inner| {
            if !inner.entries.contains_key(&entry.id) {
                return Err(EngineError::EntryNotFound(entry.id));
            }
            inner.entries.insert(entry.id, entry.clone());
            Ok(())
        })
    }

    fn remove_entry(&self, id: Uuid) -> EngineResult<Entry> {
        self.locked(|inner| inner.entries.remove(&id).ok_or(EngineError::EntryNotFound(id)))
    }

    fn entry(&self, id: Uuid) -> EngineResult<Entry> {
        self.locked(|inner| {
            inner
                .entries
                .get(&id)
                .cloned()
                .ok_or(EngineError::EntryNotFound(id))
        })
    }

    fn entries(&self, filter: &EntryFilter) -> EngineResult<Vec<Entry>> {
        self.locked(|inner| {
            let mut matched: Vec<Entry> = inner
                .entries
                .values()
                .filter(|entry| filter.matches(entry))
                .cloned()
                .collect();
            matched.sort_by_key(|entry| (entry.occurs_on, entry.id));
            Ok(matched)
        })
    }

    fn upsert_card(&self, card: &Card) -> EngineResult<()> {
        self.locked(|inner| upsert(&mut inner.cards, card))
    }

    fn card(&self, id: Uuid) -> EngineResult<Card> {
        self.locked(|inner| inner.cards.get(&id).cloned().ok_or(EngineError::CardNotFound(id)))
    }

    fn cards(&self) -> EngineResult<Vec<Card>> {
        self.locked(|inner| {
            let mut cards: Vec<Card> = inner.cards.values().cloned().collect();
            cards.sort_by_key(|card| card.id);
            Ok(cards)
        })
    }

    fn upsert_account(&self, account: &Account) -> EngineResult<()> {
        self.locked(|inner| upsert(&mut inner.accounts, account))
    }

    fn account(&self, id: Uuid) -> EngineResult<Account> {
        self.locked(|inner| {
            inner
                .accounts
                .get(&id)
                .cloned()
                .ok_or(EngineError::AccountNotFound(id))
        })
    }

    fn accounts(&self) -> EngineResult<Vec<Account>> {
        self.locked(|inner| {
            let mut accounts: Vec<Account> = inner.accounts.values().cloned().collect();
            accounts.sort_by_key(|account| account.id);
            Ok(accounts)
        })
    }

    fn upsert_goal(&self, goal: &MonthlyGoal) -> EngineResult<()> {
        self.locked(|inner| upsert(&mut inner.goals, goal))
    }

    fn goal(&self, id: Uuid) -> EngineResult<MonthlyGoal> {
        self.locked(|inner| inner.goals.get(&id).cloned().ok_or(EngineError::GoalNotFound(id)))
    }

    fn goals(&self) -> EngineResult<Vec<MonthlyGoal>> {
        self.locked(|inner| {
            let mut goals: Vec<MonthlyGoal> = inner.goals.values().cloned().collect();
            goals.sort_by_key(|goal| goal.id);
            Ok(goals)
        })
    }
}
