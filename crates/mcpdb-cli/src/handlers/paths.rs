//! Paths command handler.
//!
//! Displays the resolved locations for diagnostics, without opening the
//! database.

use mcpdb_core::{data_root, database_path};

use crate::error::CliError;

/// Execute the paths command.
///
/// Prints the data directory and default database file in `key = value`
/// format, plus the database URL when one was given.
pub fn execute(database_url: Option<&str>) -> Result<(), CliError> {
    println!("data_root = {}", data_root()?.display());
    println!("database_path = {}", database_path()?.display());
    if let Some(url) = database_url {
        let config = mcpdb_core::DatabaseConfig::from_url(url)?;
        println!("database_url = {}", config.redacted_url());
    }
    Ok(())
}
