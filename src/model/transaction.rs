use crate::model::{Amount, LedgerEntry, SortKey, DATE_FORMAT};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// A transaction after normalization. Every field has a value; absent input fields become empty
/// strings or zero, so nothing downstream has to ask whether a field is present.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    id: i64,
    /// The calendar day in UTC. `None` when the source date was missing or unreadable.
    date: Option<NaiveDate>,
    category: String,
    name: String,
    note: String,
    amount: Amount,
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

/// Whether money left or entered the account. Used for row styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Outflow,
    Inflow,
}

serde_plain::derive_display_from_serialize!(Flow);

impl Transaction {
    /// Builds a transaction from already-clean values. Mostly useful for tests and seed data.
    pub fn new(
        id: i64,
        date: Option<NaiveDate>,
        category: impl Into<String>,
        name: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            id,
            date,
            category: category.into(),
            name: name.into(),
            amount,
            ..Default::default()
        }
    }

    /// Fills every default and canonicalizes the date to a UTC calendar day.
    pub fn normalize(entry: LedgerEntry) -> Self {
        let id = match entry.transaction_id.as_ref().and_then(|id| id.as_i64()) {
            Some(id) => id,
            None => {
                warn!(
                    "Transaction '{}' has no usable id ({:?}); using 0",
                    entry.transaction_payee.as_deref().unwrap_or_default(),
                    entry.transaction_id
                );
                0
            }
        };
        let date = entry
            .transaction_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| {
                let parsed = normalize_date(s);
                if parsed.is_none() {
                    warn!("Transaction {id} has an unreadable date '{s}'");
                }
                parsed
            });
        let image_url = entry
            .transaction_image_url
            .map(|url| url.decode())
            .filter(|url| !url.is_empty());
        Self {
            id,
            date,
            category: entry.transaction_category.unwrap_or_default(),
            name: entry.transaction_payee.unwrap_or_default(),
            note: entry.transaction_note.unwrap_or_default(),
            amount: entry.transaction_amount.unwrap_or_default(),
            kind: entry.transaction_type.unwrap_or_default(),
            image_url,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// `YYYY-MM-DD`, or an empty string when there is no date.
    pub fn date_string(&self) -> String {
        self.date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Zero counts as an inflow.
    pub fn flow(&self) -> Flow {
        if self.amount.is_negative() {
            Flow::Outflow
        } else {
            Flow::Inflow
        }
    }

    /// Ascending comparison on a single column. Dates compare as day numbers with missing dates
    /// first, text compares lexicographically and amounts compare by value.
    pub fn compare_by(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Date => epoch_day(self.date).cmp(&epoch_day(other.date)),
            SortKey::Category => self.category.cmp(&other.category),
            SortKey::Name => self.name.cmp(&other.name),
            SortKey::Note => self.note.cmp(&other.note),
            SortKey::Amount => self.amount.value().cmp(&other.amount.value()),
        }
    }

    pub fn to_row(&self) -> TransactionRow {
        TransactionRow {
            id: self.id,
            date: self.date_string(),
            category: self.category.clone(),
            name: self.name.clone(),
            note: self.note.clone(),
            amount: self.amount.to_string(),
            flow: self.flow(),
        }
    }
}

/// A display-ready row of the transaction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub name: String,
    pub note: String,
    pub amount: String,
    pub flow: Flow,
}

fn epoch_day(date: Option<NaiveDate>) -> Option<i32> {
    use chrono::Datelike;
    date.map(|d| d.num_days_from_ce())
}

/// Reads the date forms the API is known to send and returns the UTC calendar day.
///
/// - RFC 3339 with an offset, e.g. `2024-03-01T23:30:00-05:00`, is converted to UTC first.
/// - A naive date-time, e.g. `2024-03-01T05:00:00` or `2024-03-01 05:00:00`, is taken as UTC.
/// - A bare `2024-03-01` is used as is.
pub fn normalize_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
