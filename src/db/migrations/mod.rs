//! Schema migrations for the local category store.
//!
//! Each migration lives next to this file as `migration_NN_up.sql` and `migration_NN_down.sql`.
//! Going up from version `NN-1` runs the up script of `NN`; going down from `NN` runs its down
//! script. The version reached is recorded in the single-row `schema_version` table.

use crate::error::Res;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

/// The schema version that this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table at version 0 if it does not exist yet.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Res<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to count schema_version rows")?;
    if rows == 0 {
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await
            .context("Failed to insert initial schema version")?;
    }
    Ok(())
}

/// Reads the schema version recorded in the database.
pub(crate) async fn version(pool: &SqlitePool) -> Res<i32> {
    let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(version)
}

/// Moves the schema from `from` to `to`, one migration at a time, each in its own transaction.
/// Nothing runs unless every migration on the way is available.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Res<()> {
    if from == to {
        debug!("Database already at schema version {to}");
        return Ok(());
    }

    for (sql, reached) in steps(from, to)? {
        debug!("Migrating schema to version {reached:02}");
        apply(pool, sql, reached).await?;
    }

    debug!("Schema now at version {to}");
    Ok(())
}

/// Resolves the ordered list of `(sql, version reached)` pairs for going from `from` to `to`.
fn steps(from: i32, to: i32) -> Res<Vec<(&'static str, i32)>> {
    let find = |version: i32| {
        MIGRATIONS.iter().find(|m| m.version == version).with_context(|| {
            format!("Migration {version} is missing but required to migrate from {from} to {to}")
        })
    };

    let mut steps = Vec::new();
    if from < to {
        for version in (from + 1)..=to {
            steps.push((find(version)?.up_sql, version));
        }
    } else {
        for version in ((to + 1)..=from).rev() {
            steps.push((find(version)?.down_sql, version - 1));
        }
    }
    if steps.is_empty() {
        bail!("No migration path from {from} to {to}");
    }
    Ok(steps)
}

async fn apply(pool: &SqlitePool, sql: &str, reached: i32) -> Res<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(reached)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn create_test_db() -> (TempDir, SqlitePool) {
        let temp_dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        bootstrap(&pool).await.unwrap();
        (temp_dir, pool)
    }

    async fn table_exists(pool: &SqlitePool, table_name: &str) -> bool {
        let (count,): (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table_name)
                .fetch_one(pool)
                .await
                .unwrap();
        count > 0
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let (_dir, pool) = create_test_db().await;
        bootstrap(&pool).await.unwrap();
        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_up_then_down() {
        let (_dir, pool) = create_test_db().await;

        run(&pool, 0, CURRENT_VERSION).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), CURRENT_VERSION);
        assert!(table_exists(&pool, "categories").await);

        run(&pool, CURRENT_VERSION, 0).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "categories").await);
    }

    #[tokio::test]
    async fn test_no_op_at_target() {
        let (_dir, pool) = create_test_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 1).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 1);
    }

    #[test]
    fn test_steps_missing_migration() {
        assert!(steps(0, 1).is_ok());
        assert!(steps(1, 0).is_ok());
        assert!(steps(0, 2).is_err());
        assert!(steps(3, 1).is_err());
    }
}
