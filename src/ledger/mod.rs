//! Ledger domain models, billing-cycle math, and pure projections.

pub mod account;
pub mod bill;
pub mod card;
pub mod common;
pub mod cycle;
pub mod entry;
pub mod goal;
pub mod series;

pub use account::Account;
pub use bill::{project_bill, Bill};
pub use card::Card;
pub use common::{Displayable, Identifiable};
pub use cycle::{
    billing_period_for, due_date_for, step_occurrence, BillPeriod, RecurrenceInterval,
};
pub use entry::{BillRef, Entry, EntryKind, EntryStatus, SplitMode};
pub use goal::{GoalStanding, GoalStatus, GoalType, MonthlyGoal};
pub use series::{plan_series, split_amounts, SeriesPlan};
