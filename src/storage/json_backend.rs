use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::Identifiable;
use crate::ledger::entry::Entry;
use crate::ledger::{Account, Card, MonthlyGoal};
use crate::storage::{DocumentStore, EntryFilter};

const TMP_SUFFIX: &str = "tmp";

const ENTRIES_DIR: &str = "entries";
const CARDS_DIR: &str = "cards";
const ACCOUNTS_DIR: &str = "accounts";
const GOALS_DIR: &str = "goals";

/// File-backed store: one pretty-printed JSON document per record, grouped
/// in per-kind directories. Writes go through a tmp file and a rename so a
/// crash never leaves a half-written document, which is the only atomicity
/// this backend offers.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        for dir in [ENTRIES_DIR, CARDS_DIR, ACCOUNTS_DIR, GOALS_DIR] {
            ensure_dir(&root.join(dir))?;
        }
        Ok(Self { root })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, dir: &str, id: Uuid) -> PathBuf {
        self.root.join(dir).join(format!("{id}.json"))
    }

    fn write_document<T: Serialize>(&self, dir: &str, id: Uuid, value: &T) -> EngineResult<()> {
        let path = self.document_path(dir, id);
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&path, &json)
    }

    fn read_document<T: DeserializeOwned>(&self, dir: &str, id: Uuid) -> EngineResult<Option<T>> {
        let path = self.document_path(dir, id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn read_all<T: DeserializeOwned>(&self, dir: &str) -> EngineResult<Vec<T>> {
        let dir_path = self.root.join(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }
        let mut documents = Vec::new();
        for dir_entry in fs::read_dir(&dir_path)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read_to_string(&path)?;
            documents.push(serde_json::from_str(&data)?);
        }
        Ok(documents)
    }

    fn upsert<T: Serialize + Identifiable>(&self, dir: &str, value: &T) -> EngineResult<()> {
        self.write_document(dir, value.id(), value)
    }
}

impl DocumentStore for JsonStore {
    fn insert_entry(&self, entry: &Entry) -> EngineResult<()> {
        if self.document_path(ENTRIES_DIR, entry.id).exists() {
            return Err(EngineError::Validation(format!(
                "entry {} already exists",
                entry.id
            )));
        }
        self.write_document(ENTRIES_DIR, entry.id, entry)
    }

    fn update_entry(&self, entry: &Entry) -> EngineResult<()> {
        if !self.document_path(ENTRIES_DIR, entry.id).exists() {
            return Err(EngineError::EntryNotFound(entry.id));
        }
        self.write_document(ENTRIES_DIR, entry.id, entry)
    }

    fn remove_entry(&self, id: Uuid) -> EngineResult<Entry> {
        let entry: Entry = self
            .read_document(ENTRIES_DIR, id)?
            .ok_or(EngineError::EntryNotFound(id))?;
        fs::remove_file(self.document_path(ENTRIES_DIR, id))?;
        Ok(entry)
    }

    fn entry(&self, id: Uuid) -> EngineResult<Entry> {
        self.read_document(ENTRIES_DIR, id)?
            .ok_or(EngineError::EntryNotFound(id))
    }

    fn entries(&self, filter: &EntryFilter) -> EngineResult<Vec<Entry>> {
        let mut matched: Vec<Entry> = self
            .read_all::<Entry>(ENTRIES_DIR)?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        matched.sort_by_key(|entry| (entry.occurs_on, entry.id));
        Ok(matched)
    }

    fn upsert_card(&self, card: &Card) -> EngineResult<()> {
        self.upsert(CARDS_DIR, card)
    }

    fn card(&self, id: Uuid) -> EngineResult<Card> {
        self.read_document(CARDS_DIR, id)?
            .ok_or(EngineError::CardNotFound(id))
    }

    fn cards(&self) -> EngineResult<Vec<Card>> {
        let mut cards = self.read_all::<Card>(CARDS_DIR)?;
        cards.sort_by_key(|card| card.id);
        Ok(cards)
    }

    fn upsert_account(&self, account: &Account) -> EngineResult<()> {
        self.upsert(ACCOUNTS_DIR, account)
    }

    fn account(&self, id: Uuid) -> EngineResult<Account> {
        self.read_document(ACCOUNTS_DIR, id)?
            .ok_or(EngineError::AccountNotFound(id))
    }

    fn accounts(&self) -> EngineResult<Vec<Account>> {
        let mut accounts = self.read_all::<Account>(ACCOUNTS_DIR)?;
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    fn upsert_goal(&self, goal: &MonthlyGoal) -> EngineResult<()> {
        self.upsert(GOALS_DIR, goal)
    }

    fn goal(&self, id: Uuid) -> EngineResult<MonthlyGoal> {
        self.read_document(GOALS_DIR, id)?
            .ok_or(EngineError::GoalNotFound(id))
    }

    fn goals(&self) -> EngineResult<Vec<MonthlyGoal>> {
        let mut goals = self.read_all::<MonthlyGoal>(GOALS_DIR)?;
        goals.sort_by_key(|goal| goal.id);
        Ok(goals)
    }
}

fn ensure_dir(path: &Path) -> EngineResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
