//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestApi;
use crate::db::CategoryStore;
use crate::error::{Error, ErrorType};
use crate::model::Category;
use crate::workflow::{Preferences, Services};
use crate::{Config, Result};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// The user that `TestEnv::services` signs in as.
pub(crate) const TEST_USER: &str = "uid-1";

/// Test environment that sets up an expense home directory with Config, database and an in-memory
/// remote API. Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    api: Arc<TestApi>,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expense");
        let config = Config::create(&root, "https://api.example.com/v1", "expenses")
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
            api: Arc::new(TestApi::new()),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn store(&self) -> Arc<dyn CategoryStore> {
        self.config.store()
    }

    pub fn api(&self) -> Arc<TestApi> {
        self.api.clone()
    }

    pub fn preferences(&self) -> Arc<dyn Preferences> {
        Arc::new(self.config.clone())
    }

    /// Like `services`, but with `language` already chosen and preferences that cannot be saved.
    pub fn services_with_failing_preferences(&self, language: &str) -> Arc<Services> {
        let services = Services::new(
            self.config.categories().to_vec(),
            self.config.currencies().to_vec(),
            self.store(),
            self.api.clone(),
            Arc::new(FailingPreferences),
            self.config.database_name(),
            TEST_USER,
        )
        .with_language(Some(language.to_string()))
        .with_refresh_pulses(vec![Duration::from_millis(1); 6]);
        Arc::new(services)
    }

    /// Services wired to this environment, signed in as `TEST_USER`. Refresh pulses are shortened
    /// so that tests do not wait on them.
    pub fn services(&self) -> Arc<Services> {
        let services = Services::from_config(&self.config, self.api.clone(), TEST_USER)
            .with_refresh_pulses(vec![Duration::from_millis(1); 6]);
        Arc::new(services)
    }
}

/// `Preferences` that can never be written.
pub struct FailingPreferences;

#[async_trait::async_trait]
impl Preferences for FailingPreferences {
    async fn save_language(&self, _language: &str) -> Result<()> {
        Err(Error::new(
            ErrorType::Config,
            anyhow::anyhow!("read-only file system"),
        ))
    }
}

/// A `CategoryStore` whose every operation fails with a storage error.
pub struct FailingStore;

impl FailingStore {
    fn error() -> Error {
        Error::new(ErrorType::Storage, anyhow::anyhow!("database is locked"))
    }
}

#[async_trait::async_trait]
impl CategoryStore for FailingStore {
    async fn insert(&self, _name: &str) -> Result<Category> {
        Err(Self::error())
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        Err(Self::error())
    }

    async fn delete_all(&self) -> Result<u64> {
        Err(Self::error())
    }
}
