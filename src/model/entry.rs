//! Record shapes as they arrive from the ledger API. Every field is optional here; filling in
//! defaults is the job of `Transaction::normalize` and `CategoryShare::from_entry`.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A raw transaction row from `GET /api/transactions/`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LedgerEntry {
    pub transaction_id: Option<EntryId>,
    pub transaction_date: Option<String>,
    pub transaction_category: Option<String>,
    pub transaction_payee: Option<String>,
    pub transaction_note: Option<String>,
    pub transaction_amount: Option<Amount>,
    pub transaction_type: Option<String>,
    pub transaction_image_url: Option<ImageUrl>,
}

/// A raw row from `GET /api/dashboard/expendituresbycategory/`. The aliases let the same type
/// read raw ledger rows as well.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExpenditureEntry {
    #[serde(alias = "transaction_category", alias = "category")]
    pub budget_name: Option<String>,
    #[serde(alias = "transaction_amount", alias = "amount")]
    pub expense: Option<Amount>,
}

impl ExpenditureEntry {
    pub fn new(budget_name: impl Into<String>, expense: Amount) -> Self {
        Self {
            budget_name: Some(budget_name.into()),
            expense: Some(expense),
        }
    }
}

/// Transaction ids are numeric, but some backends send them as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl EntryId {
    /// The numeric id, or `None` if the text form does not hold an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EntryId::Number(n) => Some(*n),
            EntryId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        EntryId::Number(value)
    }
}

/// The image URL is either plain text or a serialized byte buffer such as
/// `{"type": "Buffer", "data": [104, 116, 116, 112]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageUrl {
    Text(String),
    Buffer { data: Vec<u8> },
}

impl ImageUrl {
    /// Decodes the URL. Buffer bytes map one-to-one onto characters.
    pub fn decode(&self) -> String {
        match self {
            ImageUrl::Text(s) => s.clone(),
            ImageUrl::Buffer { data } => data.iter().map(|&b| char::from(b)).collect(),
        }
    }
}
