//! Platform-specific data directory resolution.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MCPDB_DATA_DIR";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `MCPDB_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/mcpdb`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .map(|dir| dir.join("mcpdb"))
        .ok_or(PathError::NoDataDir)
}
