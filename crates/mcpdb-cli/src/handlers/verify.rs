//! Verify command handler.

use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Compare the live schema with the entity descriptors.
///
/// Prints every drift found and fails with [`CliError::Drift`] when there is
/// any.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let drift = ctx.pool.verify_schema().await?;

    if drift.is_empty() {
        info!("Schema matches the entity descriptors");
        println!("Schema OK.");
        return Ok(());
    }

    for entry in &drift {
        println!("  - {entry}");
    }
    Err(CliError::Drift(format!("{} difference(s) found", drift.len())))
}
