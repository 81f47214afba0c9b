use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::{Displayable, Identifiable};
use crate::ledger::cycle::BillPeriod;
use crate::ledger::entry::EntryKind;

/// Which side of the ledger a goal measures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalType {
    Expense,
    Income,
}

impl GoalType {
    pub fn matches(self, kind: EntryKind) -> bool {
        matches!(
            (self, kind),
            (GoalType::Expense, EntryKind::Expense) | (GoalType::Income, EntryKind::Income)
        )
    }
}

/// A monthly target for one category. The realized amount is always derived
/// from the entry set, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyGoal {
    pub id: Uuid,
    pub category_id: Uuid,
    pub goal_type: GoalType,
    pub period: BillPeriod,
    pub target_cents: i64,
}

impl MonthlyGoal {
    pub fn new(
        category_id: Uuid,
        goal_type: GoalType,
        period: BillPeriod,
        target_cents: i64,
    ) -> EngineResult<Self> {
        if target_cents <= 0 {
            return Err(EngineError::Validation(format!(
                "goal target must be positive, got {target_cents}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            category_id,
            goal_type,
            period,
            target_cents,
        })
    }
}

impl Identifiable for MonthlyGoal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for MonthlyGoal {
    fn display_label(&self) -> String {
        format!("goal:{} {:?} {}", self.id, self.goal_type, self.period)
    }
}

/// Snapshot of a goal against its realized amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalStatus {
    pub goal_id: Uuid,
    pub category_id: Uuid,
    pub goal_type: GoalType,
    pub period: BillPeriod,
    pub target_cents: i64,
    pub realized_cents: i64,
    pub remaining_cents: i64,
    pub standing: GoalStanding,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalStanding {
    Empty,
    Under,
    Met,
    Over,
}

impl GoalStatus {
    pub fn from_parts(goal: &MonthlyGoal, realized_cents: i64) -> Self {
        let remaining = goal.target_cents - realized_cents;
        let standing = if realized_cents == 0 {
            GoalStanding::Empty
        } else if realized_cents < goal.target_cents {
            GoalStanding::Under
        } else if realized_cents == goal.target_cents {
            GoalStanding::Met
        } else {
            GoalStanding::Over
        };
        Self {
            goal_id: goal.id,
            category_id: goal.category_id,
            goal_type: goal.goal_type,
            period: goal.period,
            target_cents: goal.target_cents,
            realized_cents,
            remaining_cents: remaining,
            standing,
        }
    }
}
