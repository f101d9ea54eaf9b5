//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json` and contains the address of the
//! remote API, the remote database name, the built-in category and currency lists, and user
//! preferences. The SQLite database for custom categories lives next to it.

use crate::db::{CategoryStore, Db};
use crate::error::Res;
use crate::model::{BUILT_IN_CATEGORIES, DEFAULT_CURRENCIES};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const APP_NAME: &str = "expense";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPENSE_SQLITE: &str = "expense.sqlite";

/// Delays between the refresh pulses that follow a successful submission, in milliseconds.
pub(crate) const DEFAULT_REFRESH_PULSES_MS: &[u64] = &[200, 200, 200, 200, 400, 400];

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the home directory with:
    /// - An initial `config.json` file using `api_url` and `database_name` along with defaults
    /// - An initialized SQLite database
    ///
    /// # Errors
    /// - Returns an error if the directory is already initialized or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        api_url: &str,
        database_name: &str,
    ) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expense home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!("A config file already exists at '{}'", config_path.display());
        }

        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            database_name: database_name.to_string(),
            ..ConfigFile::default()
        };
        config_file.validate()?;
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(EXPENSE_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - open the SQLite database, migrating it if needed
    pub async fn load(expense_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = expense_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expense home directory is missing, run 'expense init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(EXPENSE_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn api_url(&self) -> &str {
        &self.config_file.api_url
    }

    pub fn database_name(&self) -> &str {
        &self.config_file.database_name
    }

    /// The built-in category names, in display order.
    pub fn categories(&self) -> &[String] {
        &self.config_file.categories
    }

    pub fn currencies(&self) -> &[String] {
        &self.config_file.currencies
    }

    pub fn language(&self) -> Option<&str> {
        self.config_file.language.as_deref()
    }

    /// The signed-in user, or an empty string.
    pub fn user_id(&self) -> &str {
        self.config_file.user_id.as_deref().unwrap_or_default()
    }

    pub fn refresh_pulses(&self) -> Vec<Duration> {
        self.config_file
            .refresh_pulses_ms
            .as_deref()
            .unwrap_or(DEFAULT_REFRESH_PULSES_MS)
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// The local category store.
    pub fn store(&self) -> Arc<dyn CategoryStore> {
        Arc::new(self.db.clone())
    }

    /// Persists `language` to the config file on disk.
    pub(crate) async fn persist_language(&self, language: &str) -> Res<()> {
        // Re-read so that a concurrent edit of other fields is not overwritten.
        let mut file = ConfigFile::load(&self.config_path).await?;
        file.language = Some(language.to_string());
        file.save(&self.config_path).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense",
///   "config_version": 1,
///   "api_url": "https://api.example.com/v1",
///   "database_name": "expenses",
///   "categories": ["Food", "Transport"],
///   "currencies": ["USD", "KHR"],
///   "language": "km",
///   "refresh_pulses_ms": [200, 200, 200, 200, 400, 400]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the remote expense API
    api_url: String,

    /// Name of the remote database that expenses are written to
    database_name: String,

    /// Built-in categories, shown before the custom ones
    #[serde(default = "default_categories")]
    categories: Vec<String>,

    /// Currencies offered by the entry form; the first one is the default selection
    #[serde(default = "default_currencies")]
    currencies: Vec<String>,

    /// Display language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,

    /// Overrides the delays between refresh pulses after a successful submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_pulses_ms: Option<Vec<u64>>,

    /// The signed-in user. Can be overridden on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            database_name: String::new(),
            categories: default_categories(),
            currencies: default_currencies(),
            language: None,
            refresh_pulses_ms: None,
            user_id: None,
        }
    }
}

fn default_categories() -> Vec<String> {
    BUILT_IN_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn default_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|s| s.to_string()).collect()
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from `path`.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        config
            .validate()
            .with_context(|| format!("Invalid config file at {}", path.display()))?;
        Ok(config)
    }

    /// Saves the ConfigFile to `path`.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Res<()> {
        anyhow::ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        url::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid api_url in config file: '{}'", self.api_url))?;
        anyhow::ensure!(!self.database_name.is_empty(), "database_name is empty");
        anyhow::ensure!(!self.currencies.is_empty(), "currencies is empty");
        Ok(())
    }
}
