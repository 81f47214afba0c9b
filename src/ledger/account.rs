use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::common::{Displayable, Identifiable};

/// A money account tracked within the ledger.
///
/// `balance_cents` is a cache maintained incrementally by the engine and
/// recomputable at any time from the account's completed entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub initial_balance_cents: i64,
    #[serde(default)]
    pub balance_cents: i64,
}

impl Account {
    pub fn new(name: impl Into<String>, initial_balance_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            initial_balance_cents,
            balance_cents: initial_balance_cents,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("account:{}", self.name)
    }
}
