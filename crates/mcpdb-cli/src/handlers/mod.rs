//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that call into `mcpdb-db` and format output for the
//!   terminal

pub mod migrate;
pub mod paths;
pub mod verify;
