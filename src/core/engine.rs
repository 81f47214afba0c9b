use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{
    AccountService, Anticipation, AnticipationService, BillingService, EntryService, GoalService,
    SeriesService, StatusChange,
};
use crate::errors::EngineResult;
use crate::ledger::bill::Bill;
use crate::ledger::cycle::{BillPeriod, RecurrenceInterval};
use crate::ledger::entry::{Entry, EntryStatus, SplitMode};
use crate::ledger::goal::{GoalStatus, GoalType, MonthlyGoal};
use crate::ledger::{Account, Card};
use crate::storage::{store_warnings, DocumentStore, EntryFilter};
use crate::time::{Clock, SystemClock};

/// Facade that coordinates the consistency services over one document store
/// and one clock. All bulk operations run as sequential per-document writes;
/// partial failures surface with the progress achieved.
pub struct LedgerEngine {
    store: Box<dyn DocumentStore>,
    clock: Box<dyn Clock>,
}

impl LedgerEngine {
    pub fn new(store: Box<dyn DocumentStore>, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn with_system_clock(store: Box<dyn DocumentStore>) -> Self {
        Self::new(store, Box::new(SystemClock))
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn add_account(
        &self,
        name: impl Into<String>,
        initial_balance_cents: i64,
    ) -> EngineResult<Account> {
        let account = Account::new(name, initial_balance_cents);
        self.store.upsert_account(&account)?;
        Ok(account)
    }

    pub fn add_card(
        &self,
        name: impl Into<String>,
        closing_day: u32,
        due_day: u32,
        credit_limit_cents: i64,
        payment_account_id: Uuid,
    ) -> EngineResult<Card> {
        self.store.account(payment_account_id)?;
        let card = Card::new(
            name,
            closing_day,
            due_day,
            credit_limit_cents,
            payment_account_id,
        )?;
        self.store.upsert_card(&card)?;
        Ok(card)
    }

    pub fn register_goal(
        &self,
        category_id: Uuid,
        goal_type: GoalType,
        period: BillPeriod,
        target_cents: i64,
    ) -> EngineResult<MonthlyGoal> {
        let goal = MonthlyGoal::new(category_id, goal_type, period, target_cents)?;
        GoalService::register(self.store.as_ref(), goal)
    }

    pub fn add_entry(&self, entry: Entry) -> EngineResult<Entry> {
        EntryService::add(self.store.as_ref(), self.today(), entry)
    }

    pub fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: EntryStatus,
    ) -> EngineResult<StatusChange> {
        EntryService::set_status(self.store.as_ref(), entry_id, status)
    }

    pub fn update_entry_amount(
        &self,
        entry_id: Uuid,
        amount_cents: i64,
    ) -> EngineResult<StatusChange> {
        EntryService::set_amount(self.store.as_ref(), entry_id, amount_cents)
    }

    pub fn remove_entry(&self, entry_id: Uuid) -> EngineResult<Vec<Entry>> {
        EntryService::remove(self.store.as_ref(), entry_id)
    }

    pub fn list_entries(&self, filter: &EntryFilter) -> EngineResult<Vec<Entry>> {
        EntryService::list(self.store.as_ref(), filter)
    }

    pub fn expand_series(
        &self,
        template: Entry,
        interval: RecurrenceInterval,
        count: u32,
        split_mode: SplitMode,
    ) -> EngineResult<Vec<Entry>> {
        SeriesService::expand(
            self.store.as_ref(),
            self.today(),
            template,
            interval,
            count,
            split_mode,
        )
    }

    pub fn anticipate(
        &self,
        entry_id: Uuid,
        discount_cents: Option<i64>,
    ) -> EngineResult<Anticipation> {
        AnticipationService::anticipate(self.store.as_ref(), self.today(), entry_id, discount_cents)
    }

    pub fn move_series(&self, series_id: Uuid, delta_periods: i32) -> EngineResult<usize> {
        SeriesService::shift(self.store.as_ref(), self.today(), series_id, delta_periods)
    }

    pub fn delete_from_installment(&self, series_id: Uuid, from_index: u32) -> EngineResult<usize> {
        SeriesService::truncate(self.store.as_ref(), series_id, from_index)
    }

    pub fn bill_for(&self, card_id: Uuid, period: BillPeriod) -> EngineResult<Bill> {
        BillingService::bill_for(self.store.as_ref(), card_id, period)
    }

    pub fn bills_for(&self, period: BillPeriod) -> EngineResult<Vec<Bill>> {
        BillingService::bills_for(self.store.as_ref(), period)
    }

    pub fn pay_bill(&self, card_id: Uuid, period: BillPeriod) -> EngineResult<Entry> {
        BillingService::pay_bill(self.store.as_ref(), self.today(), card_id, period)
    }

    pub fn goal_progress(
        &self,
        category_id: Uuid,
        goal_type: GoalType,
        period: BillPeriod,
    ) -> EngineResult<i64> {
        GoalService::progress(self.store.as_ref(), category_id, goal_type, period)
    }

    pub fn goal_status(&self, goal_id: Uuid) -> EngineResult<GoalStatus> {
        GoalService::status(self.store.as_ref(), goal_id)
    }

    /// Recomputes the account balance from completed entries and refreshes
    /// the cached value.
    pub fn account_balance(&self, account_id: Uuid) -> EngineResult<i64> {
        AccountService::refresh_balance(self.store.as_ref(), account_id)
    }

    pub fn adjust_balance(
        &self,
        account_id: Uuid,
        new_balance_cents: i64,
    ) -> EngineResult<Option<Entry>> {
        AccountService::adjust(self.store.as_ref(), self.today(), account_id, new_balance_cents)
    }

    /// Dangling-reference scan over the current store snapshot.
    pub fn warnings(&self) -> EngineResult<Vec<String>> {
        store_warnings(self.store.as_ref())
    }
}
