//! Types that represent the core data model, such as `Transaction` and `Amount`.
mod amount;
mod entry;
mod range;
mod sort;
mod transaction;

pub use amount::{Amount, AmountError};
pub use entry::{EntryId, ExpenditureEntry, ImageUrl, LedgerEntry};
pub use range::{DateRange, DATE_FORMAT};
pub use sort::{SortDirection, SortKey, SortSpec};
pub use transaction::{normalize_date, Flow, Transaction, TransactionRow};
