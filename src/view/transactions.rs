//! The transaction table: loading, filtering, sorting, viewing and deleting.

use crate::api::{Credentials, LedgerQueryService, TransactionDeleteService};
use crate::cache::TransactionCache;
use crate::model::{DateRange, SortKey, SortSpec, Transaction, TransactionRow};
use crate::view::load::{LoadSequence, LoadTicket};
use crate::view::{ConfirmationPrompt, Notice, NotificationSink, Prompt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// The category filter value that shows every transaction.
pub const ALL_CATEGORIES: &str = "All categories";

/// Transactions that pass the category filter, in their original order. `ALL_CATEGORIES` and the
/// empty string match everything; any other value must match exactly.
pub fn filter_by_category(transactions: &[Transaction], category: &str) -> Vec<Transaction> {
    if category == ALL_CATEGORIES || category.is_empty() {
        return transactions.to_vec();
    }
    transactions
        .iter()
        .filter(|t| t.category() == category)
        .cloned()
        .collect()
}

/// A stable sort on one column. Equal keys keep their input order in either direction.
pub fn sort_by(transactions: &[Transaction], spec: SortSpec) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| spec.direction.apply(a.compare_by(b, spec.key)));
    sorted
}

/// The sort after a click on the `key` column header.
pub fn toggle_sort(current: SortSpec, key: SortKey) -> SortSpec {
    current.toggle(key)
}

/// The order a fresh load is shown in: newest date first, and within a day the highest id first.
pub fn default_order(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.compare_by(a, SortKey::Date)
            .then_with(|| b.id().cmp(&a.id()))
    });
}

/// Fetches and normalizes the range, in default order. A transport failure is logged and yields
/// an empty list; it never reaches the caller.
pub async fn fetch_transactions(
    service: &dyn LedgerQueryService,
    credentials: &Credentials,
    range: DateRange,
) -> Vec<Transaction> {
    try_fetch_transactions(service, credentials, range)
        .await
        .unwrap_or_default()
}

/// Like `fetch_transactions`, but `None` tells a failed fetch apart from an empty range.
async fn try_fetch_transactions(
    service: &dyn LedgerQueryService,
    credentials: &Credentials,
    range: DateRange,
) -> Option<Vec<Transaction>> {
    match service.fetch_transactions(credentials, range).await {
        Ok(entries) => {
            debug!("Fetched {} transactions for {range}", entries.len());
            let mut transactions: Vec<Transaction> =
                entries.into_iter().map(Transaction::normalize).collect();
            default_order(&mut transactions);
            Some(transactions)
        }
        Err(e) => {
            error!("Failed to fetch transactions: {e:#}");
            None
        }
    }
}

/// The result of `TransactionListModel::request_delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOutcome {
    /// The user said no. Nothing was sent.
    Declined,
    /// Removed remotely and locally.
    Deleted,
    /// The remote delete failed and local state is unchanged.
    Failed,
}

serde_plain::derive_display_from_serialize!(DeleteOutcome);

/// Owns the fetched transactions and the table's interaction state.
pub struct TransactionListModel {
    transactions: Vec<Transaction>,
    sort: SortSpec,
    category: String,
    viewing: Option<i64>,
    cache: Option<Box<dyn TransactionCache>>,
    loads: LoadSequence,
}

impl Default for TransactionListModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionListModel {
    /// An empty table sorted by date, newest first, showing all categories.
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            sort: SortSpec::default(),
            category: ALL_CATEGORIES.to_string(),
            viewing: None,
            cache: None,
            loads: LoadSequence::default(),
        }
    }

    /// Attaches a persisted copy of the list and seeds the table from it. An unreadable cache is
    /// logged and ignored.
    pub async fn with_cache(mut self, cache: Box<dyn TransactionCache>) -> Self {
        match cache.load().await {
            Ok(cached) => {
                debug!("Seeded {} transactions from the cache", cached.len());
                self.transactions = cached;
            }
            Err(e) => warn!("Unable to read the transaction cache: {e:#}"),
        }
        self.cache = Some(cache);
        self
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The table as displayed: filtered by category, then sorted.
    pub fn rows(&self) -> Vec<Transaction> {
        sort_by(&filter_by_category(&self.transactions, &self.category), self.sort)
    }

    pub fn display_rows(&self) -> Vec<TransactionRow> {
        self.rows().iter().map(Transaction::to_row).collect()
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// A click on the `key` column header.
    pub fn toggle_sort(&mut self, key: SortKey) -> SortSpec {
        self.sort = toggle_sort(self.sort, key);
        self.sort
    }

    /// Opens the detail view for `transaction`, replacing any previous selection.
    pub fn select_for_view(&mut self, transaction: &Transaction) {
        self.viewing = Some(transaction.id());
    }

    pub fn clear_view(&mut self) {
        self.viewing = None;
    }

    /// The transaction in the detail view, if it is still in the list.
    pub fn viewing(&self) -> Option<&Transaction> {
        let id = self.viewing?;
        self.find(id)
    }

    pub fn find(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn begin_load(&mut self, range: DateRange) -> LoadTicket {
        self.loads.issue(range)
    }

    /// Replaces the list unless a newer load has already been applied.
    pub fn apply(&mut self, ticket: LoadTicket, transactions: Vec<Transaction>) -> bool {
        if !self.loads.accept(ticket) {
            return false;
        }
        self.transactions = transactions;
        true
    }

    /// Loads `range` and applies the result. A successful fetch also replaces the cached list; a
    /// failed one shows an empty table but leaves the cache as it was.
    pub async fn load(
        &mut self,
        service: &dyn LedgerQueryService,
        credentials: &Credentials,
        range: DateRange,
    ) -> &[Transaction] {
        let ticket = self.begin_load(range);
        match try_fetch_transactions(service, credentials, ticket.range()).await {
            Some(transactions) => {
                if self.apply(ticket, transactions) {
                    self.store_cache().await;
                }
            }
            None => {
                self.apply(ticket, Vec::new());
            }
        }
        &self.transactions
    }

    async fn store_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&self.transactions).await {
                warn!("Unable to update the transaction cache: {e:#}");
            }
        }
    }

    /// First step of a delete: ask the user.
    pub async fn confirm_delete(
        &self,
        transaction: &Transaction,
        confirmer: &dyn ConfirmationPrompt,
    ) -> bool {
        let confirmed = confirmer.confirm(&Prompt::delete_transaction()).await;
        debug!(
            "Delete of transaction {} {}",
            transaction.id(),
            if confirmed { "confirmed" } else { "declined" }
        );
        confirmed
    }

    /// Second step of a delete: remove remotely, then locally. On a remote failure the user is
    /// notified and nothing local changes.
    pub async fn perform_delete(
        &mut self,
        transaction_id: i64,
        service: &dyn TransactionDeleteService,
        credentials: &Credentials,
        notifier: &dyn NotificationSink,
    ) -> DeleteOutcome {
        if let Err(e) = service.delete_by_id(credentials, transaction_id).await {
            error!("Failed to delete transaction {transaction_id}: {e:#}");
            notifier.notify(Notice::error(
                "Error",
                "Failed to delete transaction from the database",
            ));
            return DeleteOutcome::Failed;
        }

        // Rows without an id all share id 0, so only the first match goes
        if let Some(position) = self
            .transactions
            .iter()
            .position(|t| t.id() == transaction_id)
        {
            self.transactions.remove(position);
        }
        if self.viewing == Some(transaction_id) {
            self.viewing = None;
        }
        self.store_cache().await;
        info!("Deleted transaction {transaction_id}");
        notifier.notify(Notice::success(
            "Deleted!",
            "Your transaction has been deleted.",
        ));
        DeleteOutcome::Deleted
    }

    /// Confirms, then deletes. The delete service is only called after a yes.
    pub async fn request_delete(
        &mut self,
        transaction: &Transaction,
        confirmer: &dyn ConfirmationPrompt,
        service: &dyn TransactionDeleteService,
        credentials: &Credentials,
        notifier: &dyn NotificationSink,
    ) -> DeleteOutcome {
        if !self.confirm_delete(transaction, confirmer).await {
            return DeleteOutcome::Declined;
        }
        self.perform_delete(transaction.id(), service, credentials, notifier)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestLedger;
    use crate::cache::JsonFileCache;
    use crate::model::{Amount, EntryId, LedgerEntry, SortDirection};
    use crate::view::NoticeLevel;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Answer(bool);

    #[async_trait::async_trait]
    impl ConfirmationPrompt for Answer {
        async fn confirm(&self, _prompt: &Prompt) -> bool {
            self.0
        }
    }

    struct AlwaysOk;

    #[async_trait::async_trait]
    impl TransactionDeleteService for AlwaysOk {
        async fn delete_by_id(&self, _credentials: &Credentials, _id: i64) -> crate::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<Notice>>);

    impl NotificationSink for RecordingSink {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    impl RecordingSink {
        fn notices(&self) -> Vec<Notice> {
            self.0.lock().unwrap().clone()
        }
    }

    fn entry(id: i64, date: &str, category: &str, payee: &str, amount: &str) -> LedgerEntry {
        LedgerEntry {
            transaction_id: Some(EntryId::Number(id)),
            transaction_date: Some(date.to_string()),
            transaction_category: Some(category.to_string()),
            transaction_payee: Some(payee.to_string()),
            transaction_amount: Some(Amount::from_str(amount).unwrap()),
            ..Default::default()
        }
    }

    fn txn(id: i64, date: &str, category: &str, payee: &str, amount: &str) -> Transaction {
        Transaction::normalize(entry(id, date, category, payee, amount))
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(1, "2024-03-03", "Food", "Bakery", "-4.50"),
            txn(2, "2024-03-01", "Rent", "Landlord", "-1200"),
            txn(3, "2024-03-02", "Food", "Grocer", "-60.10"),
            txn(4, "2024-03-02", "Income", "Employer", "3000"),
            txn(5, "2024-03-01", "Food", "Cafe", "-4.50"),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(Transaction::id).collect()
    }

    fn credentials() -> Credentials {
        Credentials::new("1", "t")
    }

    fn march() -> DateRange {
        DateRange::parse("2024-03-01", "2024-03-31").unwrap()
    }

    fn ledger_with_id_7() -> TestLedger {
        TestLedger::new(vec![
            entry(7, "2024-03-05", "Food", "Deli", "-12"),
            entry(8, "2024-03-06", "Rent", "Landlord", "-900"),
        ])
    }

    #[test]
    fn test_filter_all_categories_is_identity() {
        let transactions = sample();
        assert_eq!(filter_by_category(&transactions, ALL_CATEGORIES), transactions);
        assert_eq!(filter_by_category(&transactions, ""), transactions);
        assert!(filter_by_category(&[], ALL_CATEGORIES).is_empty());
    }

    #[test]
    fn test_filter_exact_match() {
        let food = filter_by_category(&sample(), "Food");
        assert_eq!(ids(&food), vec![1, 3, 5]);
        assert!(filter_by_category(&sample(), "food").is_empty());
    }

    #[test]
    fn test_sort_by_is_stable() {
        let spec = SortSpec::new(SortKey::Category, SortDirection::Ascending);
        assert_eq!(ids(&sort_by(&sample(), spec)), vec![1, 3, 5, 4, 2]);
        let spec = SortSpec::new(SortKey::Category, SortDirection::Descending);
        assert_eq!(ids(&sort_by(&sample(), spec)), vec![2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_sort_by_amount_numeric() {
        let spec = SortSpec::new(SortKey::Amount, SortDirection::Ascending);
        assert_eq!(ids(&sort_by(&sample(), spec)), vec![2, 3, 1, 5, 4]);
    }

    #[test]
    fn test_sort_by_date_uses_days() {
        let spec = SortSpec::new(SortKey::Date, SortDirection::Ascending);
        assert_eq!(ids(&sort_by(&sample(), spec)), vec![2, 5, 3, 4, 1]);
        let spec = SortSpec::new(SortKey::Date, SortDirection::Descending);
        assert_eq!(ids(&sort_by(&sample(), spec)), vec![1, 3, 4, 2, 5]);
    }

    #[test]
    fn test_sort_by_is_idempotent() {
        for key in [
            SortKey::Date,
            SortKey::Category,
            SortKey::Name,
            SortKey::Note,
            SortKey::Amount,
        ] {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let spec = SortSpec::new(key, direction);
                let once = sort_by(&sample(), spec);
                assert_eq!(sort_by(&once, spec), once, "{key} {direction}");
            }
        }
    }

    #[test]
    fn test_toggle_sort_examples() {
        let date_desc = SortSpec::new(SortKey::Date, SortDirection::Descending);
        let date_asc = SortSpec::new(SortKey::Date, SortDirection::Ascending);
        assert_eq!(toggle_sort(date_desc, SortKey::Date), date_asc);
        assert_eq!(toggle_sort(date_asc, SortKey::Date), date_desc);
        assert_eq!(
            toggle_sort(date_desc, SortKey::Category),
            SortSpec::new(SortKey::Category, SortDirection::Descending)
        );
    }

    #[test]
    fn test_default_order_breaks_ties_by_id() {
        let mut transactions = vec![
            txn(5, "2024-03-01", "A", "", "1"),
            txn(9, "2024-03-01", "A", "", "1"),
            txn(2, "2024-02-28", "A", "", "1"),
            txn(3, "2024-03-04", "A", "", "1"),
        ];
        default_order(&mut transactions);
        assert_eq!(ids(&transactions), vec![3, 9, 5, 2]);
    }

    #[test]
    fn test_rows_filter_then_sort() {
        let mut model = TransactionListModel::new();
        let ticket = model.begin_load(march());
        model.apply(ticket, sample());
        model.set_category("Food");
        model.toggle_sort(SortKey::Name);
        let rows = model.display_rows();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Grocer", "Cafe", "Bakery"]);
        model.toggle_sort(SortKey::Name);
        assert_eq!(model.sort_spec().direction, SortDirection::Ascending);
        assert_eq!(ids(&model.rows()), vec![1, 5, 3]);
    }

    #[tokio::test]
    async fn test_load_normalizes_and_orders() {
        let ledger = TestLedger::new(vec![
            entry(5, "2024-03-01T10:00:00Z", "Food", "Cafe", "-3"),
            entry(9, "2024-03-01T02:00:00Z", "Food", "Deli", "-8"),
            entry(1, "2024-03-02T00:00:00Z", "Rent", "Landlord", "-900"),
        ]);
        let mut model = TransactionListModel::new();
        let loaded = model.load(&ledger, &credentials(), march()).await;
        assert_eq!(ids(loaded), vec![1, 9, 5]);
        assert_eq!(loaded[1].date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_load_transport_failure_is_empty() {
        let ledger = TestLedger::default();
        ledger.set_fail_queries(true);
        let mut model = TransactionListModel::new();
        let ticket = model.begin_load(march());
        model.apply(ticket, sample());
        assert!(model.load(&ledger, &credentials(), march()).await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let ledger = ledger_with_id_7();
        let mut model = TransactionListModel::new();
        let old = model.begin_load(march());
        let new = model.begin_load(march());
        assert!(model.apply(new, sample()));
        let late = fetch_transactions(&ledger, &credentials(), old.range()).await;
        assert!(!model.apply(old, late));
        assert_eq!(ids(model.transactions()), ids(&sample()));
    }

    #[test]
    fn test_single_view_selection() {
        let mut model = TransactionListModel::new();
        let ticket = model.begin_load(march());
        model.apply(ticket, sample());
        let first = model.transactions()[0].clone();
        let second = model.transactions()[1].clone();
        model.select_for_view(&first);
        model.select_for_view(&second);
        assert_eq!(model.viewing(), Some(&second));
        model.clear_view();
        assert_eq!(model.viewing(), None);
    }

    #[tokio::test]
    async fn test_delete_declined_changes_nothing() {
        let ledger = ledger_with_id_7();
        let sink = RecordingSink::default();
        let mut model = TransactionListModel::new();
        model.load(&ledger, &credentials(), march()).await;
        let target = model.find(7).unwrap().clone();

        let outcome = model
            .request_delete(&target, &Answer(false), &ledger, &credentials(), &sink)
            .await;

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(ids(model.transactions()), vec![8, 7]);
        assert!(ledger.delete_calls().is_empty());
        assert!(sink.notices().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_notifies_and_keeps_state() {
        let ledger = ledger_with_id_7();
        ledger.set_fail_deletes(true);
        let sink = RecordingSink::default();
        let mut model = TransactionListModel::new();
        model.load(&ledger, &credentials(), march()).await;
        let target = model.find(7).unwrap().clone();

        let outcome = model
            .request_delete(&target, &Answer(true), &ledger, &credentials(), &sink)
            .await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert_eq!(ids(model.transactions()), vec![8, 7]);
        assert_eq!(ledger.delete_calls(), vec![7]);
        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_delete_success_updates_list_view_and_cache() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("cache").join("transactions.json");
        let ledger = ledger_with_id_7();
        let sink = RecordingSink::default();
        let mut model = TransactionListModel::new()
            .with_cache(Box::new(JsonFileCache::new(&cache_path)))
            .await;
        model.load(&ledger, &credentials(), march()).await;
        let target = model.find(7).unwrap().clone();
        model.select_for_view(&target);

        let outcome = model
            .request_delete(&target, &Answer(true), &ledger, &credentials(), &sink)
            .await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(ids(model.transactions()), vec![8]);
        assert_eq!(model.viewing(), None);
        assert_eq!(sink.notices()[0].level, NoticeLevel::Success);
        assert_eq!(ledger.get_state().entries.len(), 1);

        let cached = JsonFileCache::new(&cache_path).load().await.unwrap();
        assert_eq!(ids(&cached), vec![8]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_the_cache() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("t.json"));
        cache.store(&sample()).await.unwrap();
        let ledger = ledger_with_id_7();
        ledger.set_fail_queries(true);

        let mut model = TransactionListModel::new()
            .with_cache(Box::new(cache.clone()))
            .await;
        assert!(model.load(&ledger, &credentials(), march()).await.is_empty());
        assert_eq!(ids(&cache.load().await.unwrap()), ids(&sample()));

        ledger.set_fail_queries(false);
        model.load(&ledger, &credentials(), march()).await;
        assert_eq!(ids(&cache.load().await.unwrap()), vec![8, 7]);
    }

    #[tokio::test]
    async fn test_delete_removes_one_row_when_ids_repeat() {
        let without_id = |payee: &str| LedgerEntry {
            transaction_date: Some("2024-03-04".to_string()),
            transaction_payee: Some(payee.to_string()),
            ..Default::default()
        };
        let ledger = TestLedger::new(vec![without_id("First"), without_id("Second")]);
        let sink = RecordingSink::default();
        let mut model = TransactionListModel::new();
        model.load(&ledger, &credentials(), march()).await;
        let target = model.transactions()[0].clone();
        assert_eq!(target.id(), 0);

        let outcome = model
            .request_delete(&target, &Answer(true), &AlwaysOk, &credentials(), &sink)
            .await;
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(model.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_with_cache_seeds_list() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("t.json"));
        cache.store(&sample()).await.unwrap();
        let model = TransactionListModel::new().with_cache(Box::new(cache)).await;
        assert_eq!(ids(model.transactions()), ids(&sample()));
    }
}
