//! View models for the dashboard. They own fetched data and expose read-only, display-ready
//! state; every change goes through one of their operations.

mod category;
mod clock;
mod load;
mod prompt;
mod transactions;

pub use category::{
    fetch_series, CategoryAggregator, CategorySeries, CategoryShare, PercentageError,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use load::LoadTicket;
pub use prompt::{
    AssumeYes, ConfirmationPrompt, Notice, NoticeLevel, NotificationSink, Prompt, TerminalPrompt,
    TracingNotifier,
};
pub use transactions::{
    default_order, fetch_transactions, filter_by_category, sort_by, toggle_sort, DeleteOutcome,
    TransactionListModel, ALL_CATEGORIES,
};
