//! Bill projection and settlement.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::AccountService;
use crate::errors::{EngineError, EngineResult};
use crate::ledger::bill::{project_bill, Bill};
use crate::ledger::cycle::BillPeriod;
use crate::ledger::entry::{BillRef, Entry, EntryKind, EntryStatus};
use crate::storage::{DocumentStore, EntryFilter};

pub struct BillingService;

impl BillingService {
    /// Materializes one card's bill for a period from the current entry set.
    pub fn bill_for(
        store: &dyn DocumentStore,
        card_id: Uuid,
        period: BillPeriod,
    ) -> EngineResult<Bill> {
        let card = store.card(card_id)?;
        let entries = store.entries(&EntryFilter::default())?;
        Ok(project_bill(&card, period, &entries))
    }

    /// Materializes the period's bill for every known card.
    pub fn bills_for(store: &dyn DocumentStore, period: BillPeriod) -> EngineResult<Vec<Bill>> {
        let entries = store.entries(&EntryFilter::default())?;
        Ok(store
            .cards()?
            .iter()
            .map(|card| project_bill(card, period, &entries))
            .collect())
    }

    /// Settles a bill: records one completed expense against the card's
    /// payment account for the bill's open total, referencing the (card,
    /// period) pair. The settlement stays out of ordinary listings and spend
    /// totals; the card purchases it covers already carried the spending.
    pub fn pay_bill(
        store: &dyn DocumentStore,
        today: NaiveDate,
        card_id: Uuid,
        period: BillPeriod,
    ) -> EngineResult<Entry> {
        let card = store.card(card_id)?;
        let bill = Self::bill_for(store, card_id, period)?;
        if bill.paid {
            return Err(EngineError::Precondition(format!(
                "bill {period} for card {card_id} is already settled"
            )));
        }
        if bill.total_cents <= 0 {
            return Err(EngineError::Validation(format!(
                "bill {period} for card {card_id} has nothing to settle"
            )));
        }
        store.account(card.payment_account_id)?;

        let mut settlement = Entry::new(
            EntryKind::Expense,
            bill.total_cents,
            format!("{} bill {}", card.name, period),
            today,
        )
        .with_account(card.payment_account_id)
        .with_status(EntryStatus::Completed);
        settlement.settles = Some(BillRef { card_id, period });

        store.insert_entry(&settlement)?;
        AccountService::apply_entry_to_caches(store, &settlement, 1)?;
        tracing::info!("settled bill {} for card {}", period, card_id);
        Ok(settlement)
    }
}
