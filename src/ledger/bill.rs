use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::card::Card;
use crate::ledger::cycle::BillPeriod;
use crate::ledger::entry::{BillRef, Entry, EntryStatus};

/// One card's bill for one period. A materialized view over the entry set,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub card_id: Uuid,
    pub period: BillPeriod,
    pub due_on: NaiveDate,
    pub entries: Vec<Entry>,
    pub total_cents: i64,
    pub paid: bool,
}

/// Projects a bill from the full entry slice. Settlement entries are not
/// constituents; they only drive the paid flag. Cancelled entries stay
/// listed but are excluded from the total.
pub fn project_bill(card: &Card, period: BillPeriod, entries: &[Entry]) -> Bill {
    let reference = BillRef {
        card_id: card.id,
        period,
    };

    let mut constituents: Vec<Entry> = entries
        .iter()
        .filter(|entry| {
            entry.card_id == Some(card.id)
                && entry.bill_period == Some(period)
                && !entry.is_settlement()
        })
        .cloned()
        .collect();
    constituents.sort_by_key(|entry| (entry.occurs_on, entry.id));

    let total_cents = constituents
        .iter()
        .filter(|entry| entry.status != EntryStatus::Cancelled)
        .map(|entry| entry.amount_cents)
        .sum();

    let paid = entries
        .iter()
        .any(|entry| entry.settles == Some(reference) && entry.status == EntryStatus::Completed);

    Bill {
        card_id: card.id,
        period,
        due_on: card.due_date(period),
        entries: constituents,
        total_cents,
        paid,
    }
}
