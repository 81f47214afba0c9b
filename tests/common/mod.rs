#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

use ledger_core::errors::{EngineError, EngineResult};
use ledger_core::ledger::entry::Entry;
use ledger_core::ledger::{Account, Card, MonthlyGoal};
use ledger_core::storage::{DocumentStore, EntryFilter, JsonStore, MemoryStore};
use ledger_core::time::FixedClock;
use ledger_core::LedgerEngine;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine over an in-memory store with a pinned clock.
pub fn engine_at(today: NaiveDate) -> LedgerEngine {
    LedgerEngine::new(Box::new(MemoryStore::new()), Box::new(FixedClock(today)))
}

/// Engine over a JSON store rooted in a fresh temporary directory.
pub fn json_engine_at(today: NaiveDate) -> LedgerEngine {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonStore::new(temp.path()).expect("create json store backend");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    LedgerEngine::new(Box::new(store), Box::new(FixedClock(today)))
}

/// Seeds one checking account and one card closing on the 10th, due on the
/// 20th. Returns them for use in entry templates.
pub fn seed_account_and_card(engine: &LedgerEngine) -> (Account, Card) {
    let account = engine.add_account("Checking", 100_000).expect("account");
    let card = engine
        .add_card("Visa", 10, 20, 500_000, account.id)
        .expect("card");
    (account, card)
}

/// Store decorator that starts failing entry writes once a budget of
/// successful ones is spent. Reads and non-entry writes pass through.
pub struct FlakyStore {
    inner: MemoryStore,
    writes_left: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_after(successful_writes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            writes_left: AtomicUsize::new(successful_writes),
        }
    }

    fn take_write_slot(&self) -> EngineResult<()> {
        let left = self.writes_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(EngineError::Storage("simulated write outage".into()));
        }
        self.writes_left.store(left - 1, Ordering::SeqCst);
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    fn insert_entry(&self, entry: &Entry) -> EngineResult<()> {
        self.take_write_slot()?;
        self.inner.insert_entry(entry)
    }

    fn update_entry(&self, entry: &Entry) -> EngineResult<()> {
        self.take_write_slot()?;
        self.inner.update_entry(entry)
    }

    fn remove_entry(&self, id: Uuid) -> EngineResult<Entry> {
        self.take_write_slot()?;
        self.inner.remove_entry(id)
    }

    fn entry(&self, id: Uuid) -> EngineResult<Entry> {
        self.inner.entry(id)
    }

    fn entries(&self, filter: &EntryFilter) -> EngineResult<Vec<Entry>> {
        self.inner.entries(filter)
    }

    fn upsert_card(&self, card: &Card) -> EngineResult<()> {
        self.inner.upsert_card(card)
    }

    fn card(&self, id: Uuid) -> EngineResult<Card> {
        self.inner.card(id)
    }

    fn cards(&self) -> EngineResult<Vec<Card>> {
        self.inner.cards()
    }

    fn upsert_account(&self, account: &Account) -> EngineResult<()> {
        self.inner.upsert_account(account)
    }

    fn account(&self, id: Uuid) -> EngineResult<Account> {
        self.inner.account(id)
    }

    fn accounts(&self) -> EngineResult<Vec<Account>> {
        self.inner.accounts()
    }

    fn upsert_goal(&self, goal: &MonthlyGoal) -> EngineResult<()> {
        self.inner.upsert_goal(goal)
    }

    fn goal(&self, id: Uuid) -> EngineResult<MonthlyGoal> {
        self.inner.goal(id)
    }

    fn goals(&self) -> EngineResult<Vec<MonthlyGoal>> {
        self.inner.goals()
    }
}
