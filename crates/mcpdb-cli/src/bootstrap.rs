//! CLI bootstrap - the composition root.
//!
//! Resolves which database to use and opens it. Command handlers receive
//! the resulting [`CliContext`] and never connect on their own.

use mcpdb_core::{DatabaseConfig, database_path};
use mcpdb_db::{DatabasePool, Migrator, connect};
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database: DatabaseConfig,
}

impl CliConfig {
    /// Resolve the database from an explicit URL, falling back to the
    /// default `SQLite` file in the data directory.
    pub fn resolve(database_url: Option<&str>) -> Result<Self, CliError> {
        let database = match database_url {
            Some(url) => DatabaseConfig::from_url(url)?,
            None => DatabaseConfig::sqlite_file(&database_path()?),
        };
        debug!(url = %database.redacted_url(), "Resolved database");
        Ok(Self { database })
    }
}

/// Everything a command handler needs.
pub struct CliContext {
    pub pool: DatabasePool,
    pub migrator: Migrator,
}

/// Connect to the configured database.
pub async fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let pool = connect(&config.database)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    Ok(CliContext {
        pool,
        migrator: Migrator::default(),
    })
}
