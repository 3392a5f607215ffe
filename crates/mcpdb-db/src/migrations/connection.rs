//! Dialect-specific execution of migrations.
//!
//! The runner only talks to [`MigrationConnection`]. Each supported
//! database implements it on its concrete `sqlx` connection type so that
//! transaction handling stays specific to the engine:
//!
//! - `SQLite` disables foreign key enforcement around a migration (table
//!   rebuilds would otherwise cascade deletes), runs
//!   `PRAGMA foreign_key_check` before committing, then restores whatever
//!   enforcement the connection had.
//! - Postgres holds a session advisory lock while a run is in progress.

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Connection, Postgres, Sqlite, Transaction};
use tracing::{debug, warn};

use mcpdb_core::Dialect;

use super::error::MigrationError;
use super::runner::AppliedMigration;
use super::{Direction, Migration};

/// Key of the Postgres advisory lock taken for the duration of a run.
const PG_ADVISORY_LOCK_KEY: i64 = 0x6d63_7064_625f_6d67;

/// A database connection able to run migrations.
#[async_trait]
pub trait MigrationConnection: Send {
    /// The dialect spoken by this connection.
    fn dialect(&self) -> Dialect;

    /// Take the lock that serializes concurrent runs.
    async fn lock(&mut self) -> Result<(), MigrationError>;

    /// Release the lock taken by [`MigrationConnection::lock`].
    async fn unlock(&mut self) -> Result<(), MigrationError>;

    /// Create the bookkeeping table if it is missing.
    async fn ensure_migrations_table(&mut self) -> Result<(), MigrationError>;

    /// Applied migrations, oldest first.
    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, MigrationError>;

    /// Run one migration in one direction inside a single transaction,
    /// together with its bookkeeping change.
    async fn apply(
        &mut self,
        migration: &dyn Migration,
        direction: Direction,
    ) -> Result<(), MigrationError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite
// ─────────────────────────────────────────────────────────────────────────────

const SQLITE_CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "migrations" (
        "id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        "timestamp" bigint NOT NULL,
        "name" varchar NOT NULL
    )
"#;

#[async_trait]
impl MigrationConnection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn lock(&mut self) -> Result<(), MigrationError> {
        // Writers are already serialized by the database file lock
        Ok(())
    }

    async fn unlock(&mut self) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn ensure_migrations_table(&mut self) -> Result<(), MigrationError> {
        sqlx::query(SQLITE_CREATE_MIGRATIONS_TABLE)
            .execute(&mut *self)
            .await?;
        Ok(())
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, MigrationError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"SELECT "timestamp", "name" FROM "migrations" ORDER BY "timestamp" ASC"#,
        )
        .fetch_all(&mut *self)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(version, name)| AppliedMigration { version, name })
            .collect())
    }

    async fn apply(
        &mut self,
        migration: &dyn Migration,
        direction: Direction,
    ) -> Result<(), MigrationError> {
        // PRAGMA foreign_keys is a no-op inside a transaction, so toggle it around
        let (enforced,): (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&mut *self)
            .await?;
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *self)
            .await?;

        let result = apply_sqlite(self, migration, direction).await;

        let restore = if enforced {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        let restored = sqlx::query(restore).execute(&mut *self).await;

        result?;
        restored?;
        Ok(())
    }
}

async fn apply_sqlite(
    conn: &mut SqliteConnection,
    migration: &dyn Migration,
    direction: Direction,
) -> Result<(), MigrationError> {
    let mut tx = conn.begin().await?;

    execute_statements_sqlite(&mut tx, migration, direction).await?;

    let violations = sqlx::query("PRAGMA foreign_key_check")
        .fetch_all(&mut *tx)
        .await?;
    if !violations.is_empty() {
        warn!(
            migration = migration.name(),
            count = violations.len(),
            "Foreign key check failed, rolling back"
        );
        tx.rollback().await?;
        return Err(MigrationError::ForeignKeyViolation {
            migration: migration.name(),
            count: violations.len(),
        });
    }

    match direction {
        Direction::Up => {
            sqlx::query(r#"INSERT INTO "migrations" ("timestamp", "name") VALUES (?, ?)"#)
                .bind(migration.version())
                .bind(migration.name())
                .execute(&mut *tx)
                .await?;
        }
        Direction::Down => {
            sqlx::query(r#"DELETE FROM "migrations" WHERE "timestamp" = ?"#)
                .bind(migration.version())
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

async fn execute_statements_sqlite(
    tx: &mut Transaction<'_, Sqlite>,
    migration: &dyn Migration,
    direction: Direction,
) -> Result<(), MigrationError> {
    for (index, statement) in migration
        .statements(Dialect::Sqlite, direction)
        .iter()
        .copied()
        .enumerate()
    {
        debug!(migration = migration.name(), index, "Executing statement");
        sqlx::query(statement)
            .persistent(false)
            .execute(&mut **tx)
            .await
            .map_err(|source| MigrationError::Statement {
                migration: migration.name(),
                index,
                source,
            })?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Postgres
// ─────────────────────────────────────────────────────────────────────────────

const PG_CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "migrations" (
        "id" SERIAL NOT NULL,
        "timestamp" bigint NOT NULL,
        "name" character varying NOT NULL,
        CONSTRAINT "pk_migrations" PRIMARY KEY ("id")
    )
"#;

#[async_trait]
impl MigrationConnection for PgConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn lock(&mut self) -> Result<(), MigrationError> {
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(PG_ADVISORY_LOCK_KEY)
            .execute(&mut *self)
            .await?;
        Ok(())
    }

    async fn unlock(&mut self) -> Result<(), MigrationError> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(PG_ADVISORY_LOCK_KEY)
            .execute(&mut *self)
            .await?;
        Ok(())
    }

    async fn ensure_migrations_table(&mut self) -> Result<(), MigrationError> {
        sqlx::query(PG_CREATE_MIGRATIONS_TABLE)
            .execute(&mut *self)
            .await?;
        Ok(())
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, MigrationError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"SELECT "timestamp", "name" FROM "migrations" ORDER BY "timestamp" ASC"#,
        )
        .fetch_all(&mut *self)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(version, name)| AppliedMigration { version, name })
            .collect())
    }

    async fn apply(
        &mut self,
        migration: &dyn Migration,
        direction: Direction,
    ) -> Result<(), MigrationError> {
        let mut tx = self.begin().await?;

        execute_statements_pg(&mut tx, migration, direction).await?;

        match direction {
            Direction::Up => {
                sqlx::query(r#"INSERT INTO "migrations" ("timestamp", "name") VALUES ($1, $2)"#)
                    .bind(migration.version())
                    .bind(migration.name())
                    .execute(&mut *tx)
                    .await?;
            }
            Direction::Down => {
                sqlx::query(r#"DELETE FROM "migrations" WHERE "timestamp" = $1"#)
                    .bind(migration.version())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn execute_statements_pg(
    tx: &mut Transaction<'_, Postgres>,
    migration: &dyn Migration,
    direction: Direction,
) -> Result<(), MigrationError> {
    for (index, statement) in migration
        .statements(Dialect::Postgres, direction)
        .iter()
        .copied()
        .enumerate()
    {
        debug!(migration = migration.name(), index, "Executing statement");
        sqlx::query(statement)
            .persistent(false)
            .execute(&mut **tx)
            .await
            .map_err(|source| MigrationError::Statement {
                migration: migration.name(),
                index,
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::CreateMcpTables;

    async fn foreign_keys_enabled(conn: &mut SqliteConnection) -> bool {
        let (enabled,): (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(conn)
            .await
            .unwrap();
        enabled
    }

    async fn connect() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        conn.ensure_migrations_table().await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_apply_keeps_enforcement_on() {
        let mut conn = connect().await;
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut conn)
            .await
            .unwrap();

        conn.apply(&CreateMcpTables, Direction::Up).await.unwrap();
        assert!(foreign_keys_enabled(&mut conn).await);
    }

    #[tokio::test]
    async fn test_apply_keeps_enforcement_off() {
        let mut conn = connect().await;
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut conn)
            .await
            .unwrap();

        conn.apply(&CreateMcpTables, Direction::Up).await.unwrap();
        assert!(!foreign_keys_enabled(&mut conn).await);

        conn.apply(&CreateMcpTables, Direction::Down).await.unwrap();
        assert!(!foreign_keys_enabled(&mut conn).await);
        assert!(conn.applied_migrations().await.unwrap().is_empty());
    }
}
