//! CLI-specific error types and mappings.
//!
//! This module provides the CLI error type and maps the errors of the
//! library crates to exit codes and user-facing messages.

use mcpdb_core::{ConfigError, PathError};
use mcpdb_db::{MigrationError, VerifyError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Anything without a more specific category.
    #[error("{0}")]
    General(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The live schema does not match the entity descriptors.
    #[error("Schema drift: {0}")]
    Drift(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database or migration error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::General(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Drift(_) => 65,    // EX_DATAERR
            Self::Database(_) => 73, // EX_CANTCREAT (closest fit)
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::UnknownTarget(_) => Self::Arguments(err.to_string()),
            other => Self::Database(error_chain(&other)),
        }
    }
}

impl From<VerifyError> for CliError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::UnsupportedDialect(_) => Self::Config(err.to_string()),
            VerifyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Render an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
