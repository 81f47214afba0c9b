pub mod account_service;
pub mod anticipation_service;
pub mod billing_service;
pub mod entry_service;
pub mod goal_service;
pub mod series_service;

pub use account_service::AccountService;
pub use anticipation_service::{Anticipation, AnticipationService};
pub use billing_service::BillingService;
pub use entry_service::{EntryService, StatusChange};
pub use goal_service::GoalService;
pub use series_service::SeriesService;
