//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::{utils, Config};
use tempfile::TempDir;

pub const TEST_TOKEN: &str = "test-token";

/// Test environment that sets up a ledger-view home directory with a config and a token file.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger-view");
        let config = Config::create(&root, "http://127.0.0.1:9", "42")
            .await
            .unwrap();
        utils::write(config.token_path(), TEST_TOKEN).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

#[tokio::test]
async fn test_env_credentials() {
    let env = TestEnv::new().await;
    let credentials = env.config().credentials(None).await.unwrap();
    assert_eq!(credentials.user_id(), "42");
    assert_eq!(credentials.token(), TEST_TOKEN);
}
