//! Composition utilities for building repositories with `SQLite` backends.
//!
//! This module provides factory functions for wiring up the MCP repository.
//! It is focused purely on construction and should not contain any domain
//! logic.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use mcpdb_core::ports::McpRepository;

use crate::repositories::SqliteMcpRepository;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Open (creating if needed) and migrate the database at `db_path`.
    pub async fn create_pool(db_path: &Path) -> anyhow::Result<SqlitePool> {
        crate::setup::setup_database(db_path).await
    }

    /// Create an MCP repository from a pool.
    pub fn mcp_repository(pool: SqlitePool) -> Arc<SqliteMcpRepository> {
        Arc::new(SqliteMcpRepository::new(pool))
    }

    /// Create an MCP repository behind its port.
    ///
    /// This is the recommended way for adapters to obtain the repository.
    pub fn build_mcp_repository(pool: SqlitePool) -> Arc<dyn McpRepository> {
        Self::mcp_repository(pool)
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database migrated with the production
/// migrations, so tests always run against the real schema.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the connection pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create an MCP repository backed by this database.
    pub fn mcp_repository(&self) -> Arc<dyn McpRepository> {
        CoreFactory::build_mcp_repository(self.pool.clone())
    }
}
