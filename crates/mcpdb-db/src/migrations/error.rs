//! Migration error types.

use thiserror::Error;

/// Errors raised while applying or reverting migrations.
///
/// Statement failures are never retried or rewritten: the database error is
/// kept as the `source` and the migration's transaction is rolled back.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration statement failed.
    #[error("Migration {migration} failed at statement {index}: {source}")]
    Statement {
        migration: &'static str,
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    /// The migration left rows that reference missing parents.
    #[error("Migration {migration} left {count} foreign key violation(s)")]
    ForeignKeyViolation {
        migration: &'static str,
        count: usize,
    },

    /// The database records a migration this build does not know about.
    #[error("Database has migration {0} applied, which is unknown to this build")]
    UnknownVersion(i64),

    /// Two migrations were registered with the same version.
    #[error("Duplicate migration version {0}")]
    DuplicateVersion(i64),

    /// A target version does not name a registered migration.
    #[error("No migration with version {0}")]
    UnknownTarget(i64),

    /// Bookkeeping or connection error outside migration statements.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
