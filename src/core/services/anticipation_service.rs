//! Pulls a future installment into the currently open bill, optionally with
//! a cash discount.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::AccountService;
use crate::errors::{EngineError, EngineResult};
use crate::ledger::cycle::billing_period_for;
use crate::ledger::entry::{Entry, EntryKind, EntryStatus};
use crate::storage::DocumentStore;

/// Result of an anticipation: the relocated installment and, when a
/// discount was granted, the linked discount entry.
#[derive(Debug, Clone)]
pub struct Anticipation {
    pub entry: Entry,
    pub discount: Option<Entry>,
}

pub struct AnticipationService;

impl AnticipationService {
    /// Relocates a future series installment into today's billing period.
    /// Preconditions are checked before any write; each failure names its
    /// reason so the caller can surface it.
    pub fn anticipate(
        store: &dyn DocumentStore,
        today: NaiveDate,
        entry_id: Uuid,
        discount_cents: Option<i64>,
    ) -> EngineResult<Anticipation> {
        let mut entry = store.entry(entry_id)?;

        let Some(card_id) = entry.card_id else {
            return Err(EngineError::Validation(format!(
                "entry {entry_id} is not card funded"
            )));
        };
        if !entry.is_series_member() {
            return Err(EngineError::Validation(format!(
                "entry {entry_id} does not belong to a series"
            )));
        }
        if entry.anticipated_from.is_some() {
            return Err(EngineError::Precondition(format!(
                "entry {entry_id} was already anticipated"
            )));
        }
        if let Some(discount) = discount_cents {
            if discount <= 0 {
                return Err(EngineError::Validation(format!(
                    "discount must be positive, got {discount}"
                )));
            }
        }

        let card = store.card(card_id)?;
        let target = billing_period_for(today, card.closing_day);
        let Some(original) = entry.bill_period else {
            return Err(EngineError::Validation(format!(
                "entry {entry_id} carries no bill period"
            )));
        };
        if original <= target {
            return Err(EngineError::Precondition(format!(
                "entry {entry_id} already settles in {original}; only bills after {target} can be anticipated"
            )));
        }

        entry.anticipated_from = Some(original);
        entry.bill_period = Some(target);
        store.update_entry(&entry)?;

        let discount = match discount_cents {
            Some(amount) => {
                let mut discount_entry = Entry::new(
                    EntryKind::Expense,
                    amount,
                    format!("Anticipation discount: {}", entry.description),
                    today,
                )
                .with_card(card_id)
                .with_status(EntryStatus::Completed);
                discount_entry.bill_period = Some(target);
                discount_entry.discount_cents = Some(amount);
                discount_entry.related_entry_id = Some(entry.id);
                if let Err(source) = store.insert_entry(&discount_entry) {
                    return Err(EngineError::partial(1, 2, source));
                }
                AccountService::apply_entry_to_caches(store, &discount_entry, 1)?;
                Some(discount_entry)
            }
            None => None,
        };

        tracing::info!(
            "anticipated entry {} from {} into {}",
            entry.id,
            original,
            target
        );
        Ok(Anticipation { entry, discount })
    }
}
