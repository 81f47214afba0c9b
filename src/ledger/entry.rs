use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::{Displayable, Identifiable};
use crate::ledger::cycle::{BillPeriod, RecurrenceInterval};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryKind {
    Expense,
    Income,
    Transfer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Completed,
    Cancelled,
}

impl EntryStatus {
    /// Status a freshly created entry receives: pending when strictly in the
    /// future, completed otherwise. Assigned once at creation, never revisited.
    pub fn on_creation(occurs_on: NaiveDate, today: NaiveDate) -> Self {
        if occurs_on > today {
            EntryStatus::Pending
        } else {
            EntryStatus::Completed
        }
    }

    /// Signed delta a derived total must apply when an entry moves between
    /// statuses, possibly with an amount edit. Only completed entries count,
    /// so a no-op transition nets zero by construction.
    pub fn transition_delta(
        old: EntryStatus,
        old_amount_cents: i64,
        new: EntryStatus,
        new_amount_cents: i64,
    ) -> i64 {
        let before = match old {
            EntryStatus::Completed => old_amount_cents,
            _ => 0,
        };
        let after = match new {
            EntryStatus::Completed => new_amount_cents,
            _ => 0,
        };
        after - before
    }
}

/// How a series total maps onto member amounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// The stated total is divided across occurrences.
    Installment,
    /// Every occurrence repeats the full stated amount.
    #[default]
    Fixed,
}

/// Reference from a settlement entry to the bill it pays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillRef {
    pub card_id: Uuid,
    pub period: BillPeriod,
}

/// A single ledger line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub amount_cents: i64,
    pub description: String,
    pub occurs_on: NaiveDate,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_period: Option<BillPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<u32>,
    #[serde(default)]
    pub recurrence_interval: RecurrenceInterval,
    #[serde(default)]
    pub split_mode: SplitMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anticipated_from: Option<BillPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entry_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settles: Option<BillRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
}

impl Entry {
    pub fn new(
        kind: EntryKind,
        amount_cents: i64,
        description: impl Into<String>,
        occurs_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount_cents,
            description: description.into(),
            occurs_on,
            status: EntryStatus::Pending,
            account_id: None,
            card_id: None,
            destination_account_id: None,
            category_id: None,
            bill_period: None,
            series_id: None,
            installment_index: None,
            installment_count: None,
            recurrence_interval: RecurrenceInterval::None,
            split_mode: SplitMode::Fixed,
            anticipated_from: None,
            discount_cents: None,
            related_entry_id: None,
            settles: None,
            goal_id: None,
        }
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_card(mut self, card_id: Uuid) -> Self {
        self.card_id = Some(card_id);
        self
    }

    pub fn with_destination(mut self, account_id: Uuid) -> Self {
        self.destination_account_id = Some(account_id);
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn is_card_funded(&self) -> bool {
        self.card_id.is_some()
    }

    pub fn is_account_funded(&self) -> bool {
        self.account_id.is_some()
    }

    /// Settlement entries record a bill payment and stay out of ordinary
    /// listings and spend totals.
    pub fn is_settlement(&self) -> bool {
        self.settles.is_some()
    }

    pub fn is_discount(&self) -> bool {
        self.discount_cents.is_some()
    }

    pub fn is_series_member(&self) -> bool {
        self.series_id.is_some()
    }

    /// The month this entry counts toward: the bill period for card-funded
    /// entries, the calendar month of its date otherwise.
    pub fn effective_period(&self) -> BillPeriod {
        self.bill_period
            .unwrap_or_else(|| BillPeriod::containing(self.occurs_on))
    }

    /// Signed contribution of this entry to the given account's balance,
    /// ignoring status. Returns zero when the entry does not touch the
    /// account.
    pub fn balance_effect_on(&self, account_id: Uuid) -> i64 {
        match self.kind {
            EntryKind::Income => {
                if self.account_id == Some(account_id) {
                    self.amount_cents
                } else {
                    0
                }
            }
            EntryKind::Expense => {
                if self.account_id == Some(account_id) {
                    -self.amount_cents
                } else {
                    0
                }
            }
            EntryKind::Transfer => {
                let mut effect = 0;
                if self.account_id == Some(account_id) {
                    effect -= self.amount_cents;
                }
                if self.destination_account_id == Some(account_id) {
                    effect += self.amount_cents;
                }
                effect
            }
        }
    }

    /// Checks the structural invariants every persisted entry must satisfy.
    pub fn validate(&self) -> EngineResult<()> {
        if self.amount_cents <= 0 {
            return Err(EngineError::Validation(format!(
                "entry amount must be positive, got {}",
                self.amount_cents
            )));
        }
        match self.kind {
            EntryKind::Transfer => {
                if self.account_id.is_none() || self.destination_account_id.is_none() {
                    return Err(EngineError::Validation(
                        "transfer requires a source and a destination account".into(),
                    ));
                }
                if self.card_id.is_some() {
                    return Err(EngineError::Validation(
                        "transfer cannot be card funded".into(),
                    ));
                }
                if self.category_id.is_some() {
                    return Err(EngineError::Validation(
                        "transfer cannot carry a category".into(),
                    ));
                }
            }
            _ => {
                if self.account_id.is_some() == self.card_id.is_some() {
                    return Err(EngineError::Validation(
                        "entry must be funded by exactly one account or card".into(),
                    ));
                }
            }
        }
        if self.bill_period.is_some() && self.card_id.is_none() {
            return Err(EngineError::Validation(
                "bill period requires card funding".into(),
            ));
        }
        if let (Some(index), Some(count)) = (self.installment_index, self.installment_count) {
            if index == 0 || index > count {
                return Err(EngineError::Validation(format!(
                    "installment index {index} outside 1..={count}"
                )));
            }
        }
        Ok(())
    }
}

impl Identifiable for Entry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Entry {
    fn display_label(&self) -> String {
        format!("entry:{} [{:?}]", self.id, self.status)
    }
}
