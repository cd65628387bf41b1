//! Implements the ledger traits using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a running API server.

use crate::api::{Credentials, LedgerQueryService, TransactionDeleteService};
use crate::model::{normalize_date, Amount, DateRange, EntryId, ExpenditureEntry, LedgerEntry};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything a `TestLedger` knows, including switches that make calls fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestLedgerState {
    pub entries: Vec<LedgerEntry>,
    /// When true, both fetch calls fail as if the network were down.
    pub fail_queries: bool,
    /// When true, `delete_by_id` fails without removing anything.
    pub fail_deletes: bool,
    /// Every id passed to `delete_by_id`, successful or not.
    pub delete_calls: Vec<i64>,
}

/// An implementation of the ledger traits that does not use the network. Clones share state, so a
/// test can keep one handle to inspect what a model did through another.
#[derive(Debug, Clone)]
pub struct TestLedger {
    state: Arc<Mutex<TestLedgerState>>,
}

impl TestLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self::with_state(TestLedgerState {
            entries,
            ..Default::default()
        })
    }

    pub fn with_state(state: TestLedgerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn get_state(&self) -> TestLedgerState {
        self.lock().clone()
    }

    pub fn set_state(&self, state: TestLedgerState) {
        *self.lock() = state;
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.lock().fail_queries = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    pub fn delete_calls(&self) -> Vec<i64> {
        self.lock().delete_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TestLedgerState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TestLedger {
    /// Loads seed data from this module.
    fn default() -> Self {
        // The seed data is a compile-time constant covered by tests, so it always parses.
        Self::new(load_csv(TRANSACTION_DATA).unwrap_or_default())
    }
}

fn in_range(entry: &LedgerEntry, range: DateRange) -> bool {
    entry
        .transaction_date
        .as_deref()
        .and_then(normalize_date)
        .is_some_and(|date| range.contains(date))
}

#[async_trait::async_trait]
impl LedgerQueryService for TestLedger {
    /// Totals outflows per category, reported as positive expense amounts in first-seen order.
    async fn fetch_entries(
        &self,
        _credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<ExpenditureEntry>> {
        let state = self.lock();
        if state.fail_queries {
            bail!("TestLedger: simulated transport failure");
        }
        let mut totals: Vec<(String, Amount)> = Vec::new();
        for entry in state.entries.iter().filter(|e| in_range(e, range)) {
            let amount = entry.transaction_amount.unwrap_or_default();
            if !amount.is_negative() {
                continue;
            }
            let category = entry.transaction_category.clone().unwrap_or_default();
            let expense = Amount::new(-amount.value());
            match totals.iter_mut().find(|(name, _)| *name == category) {
                Some((name, total)) => {
                    *total = total
                        .checked_add(expense)
                        .ok_or_else(|| anyhow!("TestLedger: the {name} total overflowed"))?
                }
                None => totals.push((category, expense)),
            }
        }
        Ok(totals
            .into_iter()
            .map(|(name, expense)| ExpenditureEntry::new(name, expense))
            .collect())
    }

    async fn fetch_transactions(
        &self,
        _credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<LedgerEntry>> {
        let state = self.lock();
        if state.fail_queries {
            bail!("TestLedger: simulated transport failure");
        }
        Ok(state
            .entries
            .iter()
            .filter(|e| in_range(e, range))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl TransactionDeleteService for TestLedger {
    async fn delete_by_id(&self, _credentials: &Credentials, transaction_id: i64) -> Result<()> {
        let mut state = self.lock();
        state.delete_calls.push(transaction_id);
        if state.fail_deletes {
            bail!("TestLedger: simulated failure deleting transaction {transaction_id}");
        }
        let position = state
            .entries
            .iter()
            .position(|e| {
                e.transaction_id.as_ref().and_then(EntryId::as_i64) == Some(transaction_id)
            })
            .ok_or_else(|| anyhow!("Transaction not found: {transaction_id}"))?;
        state.entries.remove(position);
        Ok(())
    }
}

/// Loads ledger entries from a CSV-formatted string. Each row goes through the same JSON shape
/// the API returns, so the entries exercise the real deserializers.
fn load_csv(csv_data: &str) -> Result<Vec<LedgerEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));
    let headers = rdr.headers()?.clone();

    let mut entries = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result?;
        let object: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.to_string(), value.into()))
            .collect();
        let entry = serde_json::from_value(serde_json::Value::Object(object))
            .with_context(|| format!("Bad seed row {}", ix + 2))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Seed transaction data.
const TRANSACTION_DATA: &str = r##"transaction_id,transaction_date,transaction_category,transaction_payee,transaction_note,transaction_amount,transaction_type,transaction_image_url
1,2025-10-01T06:00:00.000Z,Utilities,City Water District,,-45.88,expense,
2,2025-10-01T18:40:11.000Z,Income,Acme Corp Payroll,October salary,"4,250.00",income,
3,2025-10-02T18:40:11.000Z,Restaurants,In-N-Out Burger,,-9.75,expense,
4,2025-10-03T16:55:22.000Z,Gas & Fuel,Shell Station #4521,,-61.45,expense,
5,2025-10-05T14:30:18.000Z,Groceries,Costco Wholesale,monthly stock-up,-118.56,expense,https://receipts.example.com/5.png
6,2025-10-06T06:00:00.000Z,Utilities,AT&T Wireless,,-75.00,expense,
7,2025-10-07T19:25:33.000Z,Restaurants,Olive Garden,birthday dinner,-42.30,expense,
8,2025-10-10T15:42:15.000Z,Groceries,Safeway #1534,,-95.82,expense,
9,2025-10-10T22:05:44.000Z,Coffee Shops,Blue Bottle Coffee,,-8.50,expense,
10,2025-10-12T10:00:00.000Z,Income,Refund - Outdoor Store,returned tent,129.99,income,
11,2025-10-15T16:18:33.000Z,Groceries,Trader Joe's #429,,-63.21,expense,
12,2025-10-16T06:00:00.000Z,Utilities,PG&E Electric,,-142.67,expense,
13,2025-10-18T07:22:45.000Z,Gas & Fuel,Shell Gas Station,,-52.30,expense,
14,2025-10-20T09:15:30.000Z,Groceries,Whole Foods Market,,-87.43,expense,
15,2025-10-21T12:00:00.000Z,Transfers,Savings Transfer,,0.00,transfer,
16,2025-11-02T08:12:05.000Z,Coffee Shops,Starbucks #1923,,-5.95,expense,
"##;
