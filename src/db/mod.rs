//! This module is responsible for reading, writing and managing the local SQLite database, which
//! holds the user-defined categories.

mod migrations;

use crate::error::{ErrorType, IntoResult, Res, ValidationError};
use crate::model::Category;
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, trace};

/// Local persistent table of user-defined categories.
///
/// From the point of view of the UI the store is append-only: categories are inserted and listed.
/// `delete_all` exists for maintenance only. Every operation may fail with an `ErrorType::Storage`
/// error which callers should report and recover from.
#[async_trait::async_trait]
pub trait CategoryStore: Send + Sync {
    /// Persists a new category and returns it with its store-assigned id. Duplicate names are
    /// allowed.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if `name` is empty.
    /// - `ErrorType::Storage` if the database fails.
    async fn insert(&self, name: &str) -> Result<Category>;

    /// Returns all categories ordered by name ascending.
    async fn list_all(&self) -> Result<Vec<Category>>;

    /// Removes every category and returns how many were removed. Irreversible.
    async fn delete_all(&self) -> Result<u64>;
}

/// A handle to the SQLite database. Cloning is cheap, clones share the connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let db = Self::connect(path, true).await?;
        migrations::bootstrap(&db.pool).await?;
        migrations::run(&db.pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let db = Self::connect(path, false).await?;
        migrations::bootstrap(&db.pool).await?;
        let found = migrations::version(&db.pool).await?;
        if found > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {found} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&db.pool, found, migrations::CURRENT_VERSION).await?;
        Ok(db)
    }

    async fn connect(path: &Path, create: bool) -> Res<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await
    }
}

#[async_trait::async_trait]
impl CategoryStore for Db {
    async fn insert(&self, name: &str) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyCategoryName.into());
        }
        trace!("Inserting category '{name}'");
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to insert category '{name}'"))
            .pub_result(ErrorType::Storage)?;
        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .context("Unable to read categories")
                .pub_result(ErrorType::Storage)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Category { id, name })
            .collect())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories")
            .execute(&self.pool)
            .await
            .context("Unable to delete categories")
            .pub_result(ErrorType::Storage)?;
        debug!("Deleted {} categories", result.rows_affected());
        Ok(result.rows_affected())
    }
}
