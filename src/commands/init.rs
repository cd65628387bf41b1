use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `.secrets` subdirectory and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/ledger-view`
/// - `api_host` - The base URL of the dashboard API.
/// - `user_id` - The id the API knows you by.
///
/// # Errors
/// - Returns an error if the arguments are invalid or any file operations fail.
pub async fn init(home: &Path, api_host: &str, user_id: &str) -> Result<Out<()>> {
    let config = Config::create(home, api_host, user_id)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created the ledger-view directory at '{}'. Put your session token in '{}' \
        or pass it with --token.",
        config.root().display(),
        config.token_path().display()
    )
    .into())
}
