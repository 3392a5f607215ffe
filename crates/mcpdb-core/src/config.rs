//! Database configuration.
//!
//! The database is identified by a connection URL. The URL scheme selects
//! the SQL dialect, which in turn selects the migration variant to run.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// SQL dialects with a migration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Supports in-place `ALTER TABLE ADD/DROP COLUMN` and `ADD CONSTRAINT`.
    Postgres,
    /// Requires a table rebuild to drop columns or add constraints.
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => f.write_str("postgres"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No database URL was provided.
    #[error("Database URL is empty")]
    EmptyUrl,

    /// The URL scheme does not name a supported database.
    #[error("Unsupported database URL scheme '{0}' (expected postgres://, postgresql:// or sqlite:)")]
    UnsupportedScheme(String),
}

/// Where the database lives and which dialect it speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub dialect: Dialect,
}

impl DatabaseConfig {
    /// Parse a connection URL.
    pub fn from_url(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let scheme = trimmed.split(':').next().unwrap_or_default();
        let dialect = match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Dialect::Postgres,
            "sqlite" => Dialect::Sqlite,
            _ => return Err(ConfigError::UnsupportedScheme(scheme.to_string())),
        };

        Ok(Self {
            url: trimmed.to_string(),
            dialect,
        })
    }

    /// Configuration for a `SQLite` database file.
    pub fn sqlite_file(path: &Path) -> Self {
        Self {
            url: format!("sqlite://{}", path.display()),
            dialect: Dialect::Sqlite,
        }
    }

    /// The URL with any password replaced, suitable for logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((credentials, host)) = rest.split_once('@') else {
            return self.url.clone();
        };
        match credentials.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.url.clone(),
        }
    }
}
