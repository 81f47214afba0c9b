use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// The month a card entry is attributed to for billing, which may differ
/// from its calendar date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BillPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillPeriod {
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be within 1..=12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period whose month contains the given calendar date.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn shift(self, delta_months: i32) -> Self {
        let shifted = shift_month(self.first_day(), delta_months);
        Self {
            year: shifted.year(),
            month: shifted.month(),
        }
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    fn index(self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }
}

impl Ord for BillPeriod {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index().cmp(&other.index())
    }
}

impl PartialOrd for BillPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BillPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// How a series steps from one occurrence to the next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RecurrenceInterval {
    #[default]
    None,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

/// Maps a purchase date onto the bill it settles in. Purchases up to and
/// including the closing day stay in their own month; later ones roll over.
/// The same rule decides anticipation's current period.
pub fn billing_period_for(purchase: NaiveDate, closing_day: u32) -> BillPeriod {
    let own = BillPeriod::containing(purchase);
    if purchase.day() <= closing_day {
        own
    } else {
        own.next()
    }
}

/// Resolves the calendar due date of a bill. A due day earlier than the
/// closing day falls in the month after the period; otherwise it stays in
/// the period's own month. The day is clamped to the month's length.
pub fn due_date_for(period: BillPeriod, closing_day: u32, due_day: u32) -> NaiveDate {
    let due_period = if due_day < closing_day {
        period.next()
    } else {
        period
    };
    let day = due_day.min(days_in_month(due_period.year, due_period.month));
    NaiveDate::from_ymd_opt(due_period.year, due_period.month, day).unwrap()
}

/// Steps a series base date forward to the given 0-based occurrence index.
pub fn step_occurrence(base: NaiveDate, interval: RecurrenceInterval, index: u32) -> NaiveDate {
    match interval {
        RecurrenceInterval::None => base,
        RecurrenceInterval::Weekly => base + Duration::days(7 * index as i64),
        RecurrenceInterval::Biweekly => base + Duration::days(14 * index as i64),
        RecurrenceInterval::Monthly => shift_month(base, index as i32),
        RecurrenceInterval::Yearly => shift_year(base, index as i32),
    }
}

pub(crate) fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

pub(crate) fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let mut day = date.day();
    let month = date.month();
    day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}
