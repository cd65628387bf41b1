//! The remote ledger collaborators. The view models only see the traits defined here; the
//! `HttpLedger` talks to the real API and the `TestLedger` serves seeded data from memory.

mod http;
mod test_ledger;

use crate::model::{DateRange, ExpenditureEntry, LedgerEntry};
use crate::{Config, Result};
use std::fmt::{Debug, Formatter};

pub use http::HttpLedger;
pub use test_ledger::{TestLedger, TestLedgerState};

/// When this environment variable is set and non-empty the app runs against `TestLedger`.
pub const TEST_MODE_ENV: &str = "LEDGER_VIEW_IN_TEST_MODE";

/// Reads ledger data for a user and date range.
#[async_trait::async_trait]
pub trait LedgerQueryService: Send + Sync {
    /// Per-category expenditure totals for the range.
    async fn fetch_entries(
        &self,
        credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<ExpenditureEntry>>;

    /// Raw transactions dated within the range.
    async fn fetch_transactions(
        &self,
        credentials: &Credentials,
        range: DateRange,
    ) -> Result<Vec<LedgerEntry>>;
}

/// Deletes a transaction from the remote store.
#[async_trait::async_trait]
pub trait TransactionDeleteService: Send + Sync {
    async fn delete_by_id(&self, credentials: &Credentials, transaction_id: i64) -> Result<()>;
}

/// Both halves of the remote API.
pub trait Ledger: LedgerQueryService + TransactionDeleteService {
    fn queries(&self) -> &dyn LedgerQueryService;

    fn deletes(&self) -> &dyn TransactionDeleteService;
}

impl<T> Ledger for T
where
    T: LedgerQueryService + TransactionDeleteService,
{
    fn queries(&self) -> &dyn LedgerQueryService {
        self
    }

    fn deletes(&self) -> &dyn TransactionDeleteService {
        self
    }
}

/// The user id and session token sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    token: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Selects which `Ledger` implementation the app uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `LEDGER_VIEW_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Ledger` for `mode`.
pub fn ledger(config: &Config, mode: Mode) -> Result<Box<dyn Ledger>> {
    Ok(match mode {
        Mode::Http => Box::new(HttpLedger::new(config.api_host())?),
        Mode::Test => Box::new(TestLedger::default()),
    })
}
