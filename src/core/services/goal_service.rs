//! Goal progress reconciliation over the entry set.

use uuid::Uuid;

use crate::errors::EngineResult;
use crate::ledger::cycle::BillPeriod;
use crate::ledger::entry::{Entry, EntryStatus};
use crate::ledger::goal::{GoalStatus, GoalType, MonthlyGoal};
use crate::storage::{DocumentStore, EntryFilter};

pub struct GoalService;

impl GoalService {
    pub fn register(store: &dyn DocumentStore, goal: MonthlyGoal) -> EngineResult<MonthlyGoal> {
        store.upsert_goal(&goal)?;
        Ok(goal)
    }

    /// Full recompute of a category's realized amount for one month.
    ///
    /// Card purchases count in the month of their bill period the moment
    /// they are recorded, independent of whether the bill is later paid;
    /// the settlement entry that pays the bill is excluded entirely, which
    /// is what keeps card spending from being counted twice. Long-term goal
    /// contributions are savings, not category spending, and stay out too.
    pub fn progress(
        store: &dyn DocumentStore,
        category_id: Uuid,
        goal_type: GoalType,
        period: BillPeriod,
    ) -> EngineResult<i64> {
        let entries = store.entries(&EntryFilter::by_category(category_id))?;
        Ok(entries
            .iter()
            .filter(|entry| Self::counts_toward(entry, goal_type, period))
            .map(|entry| entry.amount_cents)
            .sum())
    }

    /// Incremental counterpart of [`Self::progress`]: the signed delta a
    /// running total must apply for one entry transition. Computed by the
    /// status machine so full recompute and incremental adjustment agree.
    pub fn incremental_delta(
        old_status: EntryStatus,
        old_amount_cents: i64,
        new_status: EntryStatus,
        new_amount_cents: i64,
    ) -> i64 {
        EntryStatus::transition_delta(old_status, old_amount_cents, new_status, new_amount_cents)
    }

    /// Combines a stored goal with its derived realized amount.
    pub fn status(store: &dyn DocumentStore, goal_id: Uuid) -> EngineResult<GoalStatus> {
        let goal = store.goal(goal_id)?;
        let realized = Self::progress(store, goal.category_id, goal.goal_type, goal.period)?;
        Ok(GoalStatus::from_parts(&goal, realized))
    }

    fn counts_toward(entry: &Entry, goal_type: GoalType, period: BillPeriod) -> bool {
        goal_type.matches(entry.kind)
            && entry.status == EntryStatus::Completed
            && !entry.is_settlement()
            && entry.goal_id.is_none()
            && entry.effective_period() == period
    }
}
