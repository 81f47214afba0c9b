use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::ledger::common::{Displayable, Identifiable};
use crate::ledger::cycle::{self, BillPeriod};

/// A credit card whose purchases are grouped into monthly bills.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
    pub credit_limit_cents: i64,
    pub payment_account_id: Uuid,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        closing_day: u32,
        due_day: u32,
        credit_limit_cents: i64,
        payment_account_id: Uuid,
    ) -> EngineResult<Self> {
        if !(1..=31).contains(&closing_day) {
            return Err(EngineError::Validation(format!(
                "closing day must be within 1..=31, got {closing_day}"
            )));
        }
        if !(1..=31).contains(&due_day) {
            return Err(EngineError::Validation(format!(
                "due day must be within 1..=31, got {due_day}"
            )));
        }
        if credit_limit_cents < 0 {
            return Err(EngineError::Validation(
                "credit limit cannot be negative".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            closing_day,
            due_day,
            credit_limit_cents,
            payment_account_id,
        })
    }

    /// The bill a purchase on the given date settles in.
    pub fn billing_period_for(&self, purchase: NaiveDate) -> BillPeriod {
        cycle::billing_period_for(purchase, self.closing_day)
    }

    /// Calendar due date of the given bill period.
    pub fn due_date(&self, period: BillPeriod) -> NaiveDate {
        cycle::due_date_for(period, self.closing_day, self.due_day)
    }
}

impl Identifiable for Card {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Card {
    fn display_label(&self) -> String {
        format!("card:{} (closes {})", self.name, self.closing_day)
    }
}
