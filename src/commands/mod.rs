//! Command handlers for the ledger-view CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod categories;
mod delete;
mod init;
mod transactions;

use crate::api::{self, Credentials, Ledger, Mode};
use crate::{Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

pub use categories::{categories, CategoryLine, CategoryReport};
pub use delete::delete;
pub use init::init;
pub use transactions::{transactions, view};

/// How a command's output is written to stdout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The human-readable message: a table, a chart legend or a one-line outcome.
    #[default]
    Text,
    /// The message and the structured data as a JSON object.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print to stdout in `format`. In text mode the structured data (if it exists) also goes to
    /// `debug!` as JSON.
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => {
                println!("{}", self.message);
                if let Some(structure) = self.structure() {
                    if let Ok(json) = serde_json::to_string_pretty(structure) {
                        debug!("Command output:\n\n{json}\n\n");
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(self)
                    .context("Unable to serialize the command output")?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

/// What every data command needs: somewhere to send requests and who to send them as.
struct Session {
    ledger: Box<dyn Ledger>,
    credentials: Credentials,
}

impl Session {
    async fn open(config: &Config, mode: Mode, token: Option<&str>) -> Result<Self> {
        let credentials = match mode {
            Mode::Http => config.credentials(token).await?,
            // The in-memory ledger ignores credentials, so a missing token file is fine
            Mode::Test => config
                .credentials(token)
                .await
                .unwrap_or_else(|_| Credentials::new(config.user_id(), "test-mode")),
        };
        Ok(Self {
            ledger: api::ledger(config, mode)?,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_out_serializes_message_and_structure() {
        let out = Out::new("2 rows", vec![1, 2]);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["message"], "2 rows");
        assert_eq!(json["structure"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_message_only() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
        assert!(out.print(OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::default().to_string(), "text");
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    }
}
