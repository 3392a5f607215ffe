//! Migration ordering and bookkeeping.

use std::collections::HashSet;

use tracing::{info, warn};

use super::connection::MigrationConnection;
use super::error::MigrationError;
use super::{Direction, Migration};

/// A migration recorded in the `migrations` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
}

/// Whether a known migration has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Applied,
    Pending,
}

/// Status line for one known migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub name: &'static str,
    pub state: MigrationState,
}

/// Ordered set of migrations and the operations that move a database
/// between versions.
///
/// Migrations always run one at a time in ascending version order when
/// going up, and in descending order when going down. Each one is applied in
/// its own transaction; a failure stops the run and leaves every earlier
/// migration applied.
pub struct Migrator {
    migrations: Vec<Box<dyn Migration>>,
}

impl Default for Migrator {
    /// A migrator holding every migration shipped with this build.
    fn default() -> Self {
        Self {
            migrations: super::all(),
        }
    }
}

impl Migrator {
    /// Build a migrator from an arbitrary set of migrations.
    pub fn new(
        migrations: impl IntoIterator<Item = Box<dyn Migration>>,
    ) -> Result<Self, MigrationError> {
        let mut migrations: Vec<_> = migrations.into_iter().collect();
        migrations.sort_by_key(|m| m.version());

        for pair in migrations.windows(2) {
            if pair[0].version() == pair[1].version() {
                return Err(MigrationError::DuplicateVersion(pair[0].version()));
            }
        }

        Ok(Self { migrations })
    }

    /// Registered migrations in version order.
    pub fn migrations(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(AsRef::as_ref)
    }

    /// Version of the newest registered migration.
    pub fn latest_version(&self) -> Option<i64> {
        self.migrations.last().map(|m| m.version())
    }

    /// Apply every pending migration.
    pub async fn run<C>(&self, conn: &mut C) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        self.run_up(conn, None).await
    }

    /// Apply pending migrations up to and including `target`.
    pub async fn run_to<C>(
        &self,
        conn: &mut C,
        target: i64,
    ) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        if self.find(target).is_none() {
            return Err(MigrationError::UnknownTarget(target));
        }
        self.run_up(conn, Some(target)).await
    }

    /// Revert the most recently applied migration.
    ///
    /// Returns `None` when nothing is applied.
    pub async fn revert_last<C>(
        &self,
        conn: &mut C,
    ) -> Result<Option<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.lock().await?;
        let result = self.revert_last_locked(conn).await;
        release(result, conn.unlock().await)
    }

    /// Revert every applied migration newer than `target`, newest first.
    ///
    /// A target of `0` reverts everything.
    pub async fn revert_to<C>(
        &self,
        conn: &mut C,
        target: i64,
    ) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        if target != 0 && self.find(target).is_none() {
            return Err(MigrationError::UnknownTarget(target));
        }

        conn.lock().await?;
        let result = self.revert_to_locked(conn, target).await;
        release(result, conn.unlock().await)
    }

    /// Applied/pending state of every registered migration.
    pub async fn status<C>(&self, conn: &mut C) -> Result<Vec<MigrationStatus>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.ensure_migrations_table().await?;
        let applied = self.checked_applied_versions(conn).await?;

        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                version: m.version(),
                name: m.name(),
                state: if applied.contains(&m.version()) {
                    MigrationState::Applied
                } else {
                    MigrationState::Pending
                },
            })
            .collect())
    }

    async fn run_up<C>(
        &self,
        conn: &mut C,
        target: Option<i64>,
    ) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.lock().await?;
        let result = self.run_up_locked(conn, target).await;
        release(result, conn.unlock().await)
    }

    async fn run_up_locked<C>(
        &self,
        conn: &mut C,
        target: Option<i64>,
    ) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.ensure_migrations_table().await?;
        let applied = self.checked_applied_versions(conn).await?;
        let dialect = conn.dialect();

        let pending = self
            .migrations
            .iter()
            .filter(|m| !applied.contains(&m.version()))
            .filter(|m| target.is_none_or(|t| m.version() <= t));

        let mut newly_applied = Vec::new();
        for migration in pending {
            info!(
                migration = migration.name(),
                version = migration.version(),
                %dialect,
                "Applying migration"
            );
            if let Err(e) = conn.apply(migration.as_ref(), Direction::Up).await {
                warn!(migration = migration.name(), error = %e, "Migration rolled back");
                return Err(e);
            }
            newly_applied.push(AppliedMigration {
                version: migration.version(),
                name: migration.name().to_string(),
            });
        }

        if newly_applied.is_empty() {
            info!("Database schema is up to date");
        }
        Ok(newly_applied)
    }

    async fn revert_last_locked<C>(
        &self,
        conn: &mut C,
    ) -> Result<Option<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.ensure_migrations_table().await?;
        let applied = conn.applied_migrations().await?;
        let Some(last) = applied.into_iter().max_by_key(|m| m.version) else {
            info!("No migrations to revert");
            return Ok(None);
        };

        let migration = self
            .find(last.version)
            .ok_or(MigrationError::UnknownVersion(last.version))?;
        self.revert_one(conn, migration).await?;
        Ok(Some(last))
    }

    async fn revert_to_locked<C>(
        &self,
        conn: &mut C,
        target: i64,
    ) -> Result<Vec<AppliedMigration>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        conn.ensure_migrations_table().await?;
        let mut applied: Vec<_> = conn
            .applied_migrations()
            .await?
            .into_iter()
            .filter(|m| m.version > target)
            .collect();
        applied.sort_by_key(|m| std::cmp::Reverse(m.version));

        let mut reverted = Vec::with_capacity(applied.len());
        for record in applied {
            let migration = self
                .find(record.version)
                .ok_or(MigrationError::UnknownVersion(record.version))?;
            self.revert_one(conn, migration).await?;
            reverted.push(record);
        }
        Ok(reverted)
    }

    async fn revert_one<C>(
        &self,
        conn: &mut C,
        migration: &dyn Migration,
    ) -> Result<(), MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        info!(
            migration = migration.name(),
            version = migration.version(),
            "Reverting migration"
        );
        if let Err(e) = conn.apply(migration, Direction::Down).await {
            warn!(migration = migration.name(), error = %e, "Revert rolled back");
            return Err(e);
        }
        Ok(())
    }

    /// Applied versions, rejecting any that this build does not know.
    async fn checked_applied_versions<C>(&self, conn: &mut C) -> Result<HashSet<i64>, MigrationError>
    where
        C: MigrationConnection + ?Sized,
    {
        let applied = conn.applied_migrations().await?;
        for record in &applied {
            if self.find(record.version).is_none() {
                return Err(MigrationError::UnknownVersion(record.version));
            }
        }
        Ok(applied.into_iter().map(|m| m.version).collect())
    }

    fn find(&self, version: i64) -> Option<&dyn Migration> {
        self.migrations
            .iter()
            .find(|m| m.version() == version)
            .map(AsRef::as_ref)
    }
}

/// Combine the outcome of a locked operation with the unlock that follows.
///
/// The operation's own error wins; an unlock failure only surfaces when the
/// operation succeeded.
fn release<T>(
    result: Result<T, MigrationError>,
    unlocked: Result<(), MigrationError>,
) -> Result<T, MigrationError> {
    match (result, unlocked) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(unlock)) => Err(unlock),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(unlock)) => {
            warn!(error = %unlock, "Failed to release migration lock");
            Err(e)
        }
    }
}
