//! Document-store contract the engine writes through, plus reference
//! backends. The store offers per-document atomicity only; bulk operations
//! are sequential loops over these calls.

pub mod json_backend;
pub mod memory;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use uuid::Uuid;

use crate::errors::EngineResult;
use crate::ledger::cycle::BillPeriod;
use crate::ledger::entry::{Entry, EntryKind, EntryStatus};
use crate::ledger::{Account, Card, MonthlyGoal};

/// Conjunction of equality filters over the entry set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
    pub category_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub bill_period: Option<BillPeriod>,
}

impl EntryFilter {
    pub fn by_series(series_id: Uuid) -> Self {
        Self {
            series_id: Some(series_id),
            ..Self::default()
        }
    }

    pub fn by_card(card_id: Uuid, period: BillPeriod) -> Self {
        Self {
            card_id: Some(card_id),
            bill_period: Some(period),
            ..Self::default()
        }
    }

    pub fn by_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if entry.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(account_id) = self.account_id {
            if entry.account_id != Some(account_id) {
                return false;
            }
        }
        if let Some(card_id) = self.card_id {
            if entry.card_id != Some(card_id) {
                return false;
            }
        }
        if let Some(series_id) = self.series_id {
            if entry.series_id != Some(series_id) {
                return false;
            }
        }
        if let Some(period) = self.bill_period {
            if entry.bill_period != Some(period) {
                return false;
            }
        }
        true
    }
}

/// Abstraction over persistence backends holding the ledger's documents.
/// Each method is a single-document operation; no multi-document transaction
/// primitive is assumed.
pub trait DocumentStore: Send + Sync {
    fn insert_entry(&self, entry: &Entry) -> EngineResult<()>;
    fn update_entry(&self, entry: &Entry) -> EngineResult<()>;
    fn remove_entry(&self, id: Uuid) -> EngineResult<Entry>;
    fn entry(&self, id: Uuid) -> EngineResult<Entry>;
    fn entries(&self, filter: &EntryFilter) -> EngineResult<Vec<Entry>>;

    fn upsert_card(&self, card: &Card) -> EngineResult<()>;
    fn card(&self, id: Uuid) -> EngineResult<Card>;
    fn cards(&self) -> EngineResult<Vec<Card>>;

    fn upsert_account(&self, account: &Account) -> EngineResult<()>;
    fn account(&self, id: Uuid) -> EngineResult<Account>;
    fn accounts(&self) -> EngineResult<Vec<Account>>;

    fn upsert_goal(&self, goal: &MonthlyGoal) -> EngineResult<()>;
    fn goal(&self, id: Uuid) -> EngineResult<MonthlyGoal>;
    fn goals(&self) -> EngineResult<Vec<MonthlyGoal>>;
}

/// Detects dangling references and other anomalies within a store snapshot.
pub fn store_warnings(store: &dyn DocumentStore) -> EngineResult<Vec<String>> {
    let account_ids: HashSet<Uuid> = store.accounts()?.iter().map(|a| a.id).collect();
    let card_ids: HashSet<Uuid> = store.cards()?.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    for entry in store.entries(&EntryFilter::default())? {
        if let Some(account_id) = entry.account_id {
            if !account_ids.contains(&account_id) {
                warnings.push(format!(
                    "entry {} references unknown account {}",
                    entry.id, account_id
                ));
            }
        }
        if let Some(card_id) = entry.card_id {
            if !card_ids.contains(&card_id) {
                warnings.push(format!(
                    "entry {} references unknown card {}",
                    entry.id, card_id
                ));
            }
        }
        if let Some(destination) = entry.destination_account_id {
            if !account_ids.contains(&destination) {
                warnings.push(format!(
                    "entry {} transfers into unknown account {}",
                    entry.id, destination
                ));
            }
        }
        if entry.is_card_funded() && entry.bill_period.is_none() {
            warnings.push(format!("card entry {} carries no bill period", entry.id));
        }
    }
    Ok(warnings)
}
