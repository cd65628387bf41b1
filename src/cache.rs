//! The persisted copy of the transaction list, kept beside the config so the table can show the
//! last known rows before a load completes.

use crate::model::Transaction;
use crate::{utils, Result};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Somewhere the transaction list is persisted outside the model.
#[async_trait::async_trait]
pub trait TransactionCache: Send + Sync {
    /// The cached list. A cache that was never written is empty, not an error.
    async fn load(&self) -> Result<Vec<Transaction>>;

    /// Replaces the cached list.
    async fn store(&self, transactions: &[Transaction]) -> Result<()>;
}

/// Stores the list as pretty-printed JSON in one file. Writes go to a sibling `.tmp` file that is
/// then renamed over the cache, so an interrupted write never leaves a partial cache behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl TransactionCache for JsonFileCache {
    async fn load(&self) -> Result<Vec<Transaction>> {
        if !self.path.is_file() {
            trace!("No transaction cache at {}", self.path.display());
            return Ok(Vec::new());
        }
        utils::deserialize(&self.path).await
    }

    async fn store(&self, transactions: &[Transaction]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await?;
        }
        let json = serde_json::to_string_pretty(transactions)?;
        let temp = self.temp_path();
        utils::write(&temp, json).await?;
        utils::rename(&temp, &self.path).await
    }
}
