//! Configuration file handling for ledger-view.
//!
//! The configuration file is stored at `$LEDGER_VIEW_HOME/config.json` and holds the API host,
//! the user id and, optionally, where the session token and transaction cache live.

use crate::api::Credentials;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "ledger-view";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CACHE: &str = "cache";
const TOKEN: &str = "token";
const TRANSACTIONS_JSON: &str = "transactions.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_VIEW_HOME` and from there it loads `$LEDGER_VIEW_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and its `.secrets` subdirectory, then writes an initial
    /// `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g.
    ///   `$HOME/ledger-view`
    /// - `api_host` - The base URL of the dashboard API, e.g. `https://budget.example.com`
    /// - `user_id` - The id the API knows the user by
    ///
    /// # Errors
    /// - Returns an error if `api_host` is not a URL or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_host: &str, user_id: &str) -> Result<Self> {
        Url::parse(api_host)
            .with_context(|| format!("The API host '{api_host}' is not a valid URL"))?;
        if user_id.trim().is_empty() {
            bail!("The user id must not be empty");
        }

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger-view home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        utils::make_dir(&root.join(SECRETS)).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_host: api_host.to_string(),
            user_id: user_id.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The ledger-view home directory is missing '{}', run 'ledger-view init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_host(&self) -> &str {
        &self.config_file.api_host
    }

    pub fn user_id(&self) -> &str {
        &self.config_file.user_id
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve(self.config_file.token_path())
    }

    /// Returns the stored `cache_path` if it is absolute, otherwise resolves the relative path.
    pub fn cache_path(&self) -> PathBuf {
        self.resolve(self.config_file.cache_path())
    }

    /// Builds the request credentials. `token` wins when given; otherwise the token file is read.
    pub async fn credentials(&self, token: Option<&str>) -> Result<Credentials> {
        let token = match token {
            Some(token) => token.to_string(),
            None => {
                let path = self.token_path();
                utils::read(&path)
                    .await
                    .with_context(|| {
                        format!(
                            "No session token given and none found at '{}'",
                            path.display()
                        )
                    })?
                    .trim()
                    .to_string()
            }
        };
        if token.is_empty() {
            bail!("The session token is empty");
        }
        Ok(Credentials::new(self.user_id(), token))
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger-view",
///   "config_version": 1,
///   "api_host": "https://budget.example.com",
///   "user_id": "42",
///   "token_path": ".secrets/token",
///   "cache_path": "cache/transactions.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger-view"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the dashboard API
    api_host: String,

    /// The user id sent with every request
    user_id: String,

    /// Path to a file holding the session token (optional, relative to the home or absolute).
    /// Defaults to $LEDGER_VIEW_HOME/.secrets/token if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,

    /// Path to the transaction cache (optional, relative to the home or absolute).
    /// Defaults to $LEDGER_VIEW_HOME/cache/transactions.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cache_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_host: String::new(),
            user_id: String::new(),
            token_path: None,
            cache_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN))
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(CACHE).join(TRANSACTIONS_JSON))
    }
}
