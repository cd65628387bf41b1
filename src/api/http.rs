//! Implements the ledger traits against the dashboard REST API using `reqwest`.
//!
//! The API takes its parameters as request headers rather than query strings, e.g.
//! `GET /api/transactions/` with `user_id`, `token`, `start_date` and `end_date` headers.

use crate::api::{Credentials, LedgerQueryService, TransactionDeleteService};
use crate::model::{DateRange, ExpenditureEntry, LedgerEntry};
use crate::Result;
use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

const EXPENDITURES_BY_CATEGORY: &str = "api/dashboard/expendituresbycategory/";
const TRANSACTIONS: &str = "api/transactions/";
const TRANSACTION: &str = "api/transaction/";

/// Talks to the dashboard API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    base: Url,
    client: reqwest::Client,
}

impl HttpLedger {
    /// Creates a client for the API rooted at `api_host`, e.g. `https://budget.example.com`.
    pub fn new(api_host: &str) -> Result<Self> {
        let mut base = Url::parse(api_host)
            .with_context(|| format!("The API host '{api_host}' is not a valid URL"))?;
        // `Url::join` replaces the last path segment unless the base ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Unable to build the URL for '{path}'"))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        trace!("{method} {url}");
        Ok(self
            .client
            .request(method, url)
            .header("Content-Type", "application/json")
            .header("user_id", credentials.user_id())
            .header("token", credentials.token()))
    }

    async fn get_list<T>(
        &self,
        path: &str,
        credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path, credentials)?
            .header("start_date", range.start_param())
            .header("end_date", range.end_param())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {path}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error from {path}: status {status}");
        }

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the response from {path} as JSON"))?;
        Ok(decode_list(path, body))
    }
}

/// Anything other than a JSON array is an empty list. Elements that do not fit `T` are skipped.
fn decode_list<T>(path: &str, body: serde_json::Value) -> Vec<T>
where
    T: DeserializeOwned,
{
    let serde_json::Value::Array(items) = body else {
        debug!("The response from {path} was not an array, treating it as empty");
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(ix, item)| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping element {ix} from {path}: {e}");
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl LedgerQueryService for HttpLedger {
    async fn fetch_entries(
        &self,
        credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<ExpenditureEntry>> {
        self.get_list(EXPENDITURES_BY_CATEGORY, credentials, range)
            .await
    }

    async fn fetch_transactions(
        &self,
        credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<LedgerEntry>> {
        self.get_list(TRANSACTIONS, credentials, range).await
    }
}

#[async_trait::async_trait]
impl TransactionDeleteService for HttpLedger {
    async fn delete_by_id(&self, credentials: &Credentials, transaction_id: i64) -> Result<()> {
        let response = self
            .request(Method::DELETE, TRANSACTION, credentials)?
            .header("transaction_id", transaction_id.to_string())
            .send()
            .await
            .with_context(|| format!("Failed to send the delete request for {transaction_id}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error deleting transaction {transaction_id}: status {status}");
        }
        Ok(())
    }
}
