//! Database setup and initialization.
//!
//! [`connect`] opens a pool for either dialect from a [`DatabaseConfig`];
//! the returned [`DatabasePool`] exposes the migration operations on one
//! dedicated connection. [`setup_database`] is the `SQLite` shortcut used by
//! entry points that only need a migrated pool.

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};

use mcpdb_core::schema::ENTITIES;
use mcpdb_core::{DatabaseConfig, Dialect};

use crate::migrations::{AppliedMigration, MigrationError, MigrationStatus, Migrator};
use crate::schema_check::{SchemaDrift, VerifyError, verify_sqlite_schema};

/// A connection pool for one of the supported dialects.
#[derive(Debug, Clone)]
pub enum DatabasePool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Acquire one connection from the pool and bind it to `$conn` for `$body`.
///
/// Every migration operation must run on a single connection: the Postgres
/// advisory lock and the `SQLite` foreign key pragma are both per session.
macro_rules! with_connection {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool {
            DatabasePool::Sqlite(pool) => {
                let mut pooled = pool.acquire().await?;
                let $conn = &mut *pooled;
                $body
            }
            DatabasePool::Postgres(pool) => {
                let mut pooled = pool.acquire().await?;
                let $conn = &mut *pooled;
                $body
            }
        }
    };
}

impl DatabasePool {
    /// The dialect of the underlying database.
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite(_) => Dialect::Sqlite,
            Self::Postgres(_) => Dialect::Postgres,
        }
    }

    /// Apply every pending migration.
    pub async fn migrate(
        &self,
        migrator: &Migrator,
    ) -> Result<Vec<AppliedMigration>, MigrationError> {
        with_connection!(self, |conn| migrator.run(conn).await)
    }

    /// Apply pending migrations up to and including `target`.
    pub async fn migrate_to(
        &self,
        migrator: &Migrator,
        target: i64,
    ) -> Result<Vec<AppliedMigration>, MigrationError> {
        with_connection!(self, |conn| migrator.run_to(conn, target).await)
    }

    /// Revert the most recently applied migration.
    pub async fn revert_last(
        &self,
        migrator: &Migrator,
    ) -> Result<Option<AppliedMigration>, MigrationError> {
        with_connection!(self, |conn| migrator.revert_last(conn).await)
    }

    /// Revert every migration newer than `target` (`0` reverts all).
    pub async fn revert_to(
        &self,
        migrator: &Migrator,
        target: i64,
    ) -> Result<Vec<AppliedMigration>, MigrationError> {
        with_connection!(self, |conn| migrator.revert_to(conn, target).await)
    }

    /// Applied/pending state of every registered migration.
    pub async fn migration_status(
        &self,
        migrator: &Migrator,
    ) -> Result<Vec<MigrationStatus>, MigrationError> {
        with_connection!(self, |conn| migrator.status(conn).await)
    }

    /// Compare the live schema with the entity descriptors.
    pub async fn verify_schema(&self) -> Result<Vec<SchemaDrift>, VerifyError> {
        match self {
            Self::Sqlite(pool) => {
                let mut conn = pool.acquire().await?;
                Ok(verify_sqlite_schema(&mut conn, ENTITIES).await?)
            }
            Self::Postgres(_) => Err(VerifyError::UnsupportedDialect(Dialect::Postgres)),
        }
    }

    /// Close every connection in the pool.
    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Postgres(pool) => pool.close().await,
        }
    }
}

/// Open a pool for the configured database.
///
/// `SQLite` files are created when missing and always run with foreign key
/// enforcement on.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or the database is
/// unreachable.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabasePool> {
    info!(
        url = %config.redacted_url(),
        dialect = %config.dialect,
        "Connecting to database"
    );

    let pool = match config.dialect {
        Dialect::Sqlite => {
            let options = SqliteConnectOptions::from_str(&config.url)?
                .create_if_missing(true)
                .foreign_keys(true);
            DatabasePool::Sqlite(SqlitePool::connect_with(options).await?)
        }
        Dialect::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.url)
                .await?;
            DatabasePool::Postgres(pool)
        }
    };

    Ok(pool)
}

/// Sets up the `SQLite` database connection and migrates it to the latest
/// schema.
///
/// # Arguments
///
/// * `db_path` - Path to the `SQLite` database file
///
/// # Errors
///
/// Returns an error if:
/// - The database file cannot be opened or created
/// - A migration fails
///
/// # Example
///
/// ```rust,no_run
/// use mcpdb_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let db_path = Path::new("/path/to/mcpdb.db");
/// let pool = setup_database(db_path).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true),
    )
    .await?;

    migrate_sqlite(&pool).await?;
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// The pool holds a single connection that never expires, since every
/// in-memory connection is its own database.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    migrate_sqlite(&pool).await?;
    Ok(pool)
}

async fn migrate_sqlite(pool: &SqlitePool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    let applied = Migrator::default().run(&mut *conn).await?;
    debug!(count = applied.len(), "SQLite schema migrated");
    Ok(())
}
