//! Versioned schema migrations.
//!
//! Every migration provides an ordered list of SQL statements per dialect
//! and direction. The [`Migrator`] decides which migrations to run and the
//! [`MigrationConnection`] implementations execute them, one transaction per
//! migration.
//!
//! # Registered migrations
//!
//! | Version | Name | Change |
//! |---------|------|--------|
//! | 1743465600000 | `CreateMcpTables` | `mcp` and `app_connection` with a direct `mcpId` |
//! | 1744077796717 | `CreateMcpPieceTable` | moves the association into `mcp_piece` |

mod connection;
mod error;
mod m1743465600000_create_mcp_tables;
mod m1744077796717_create_mcp_piece_table;
mod runner;

use mcpdb_core::Dialect;

pub use connection::MigrationConnection;
pub use error::MigrationError;
pub use m1743465600000_create_mcp_tables::CreateMcpTables;
pub use m1744077796717_create_mcp_piece_table::CreateMcpPieceTable;
pub use runner::{AppliedMigration, MigrationState, MigrationStatus, Migrator};

/// Direction of a schema transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A versioned, reversible schema change.
///
/// Implementations are declarative: they only hand out SQL. Ordering,
/// transactions and bookkeeping belong to the runner.
pub trait Migration: Send + Sync {
    /// Monotonic version (a millisecond timestamp).
    fn version(&self) -> i64;

    /// Name recorded in the `migrations` table.
    fn name(&self) -> &'static str;

    /// Statements that move the schema forward, executed in order.
    fn up(&self, dialect: Dialect) -> &'static [&'static str];

    /// Statements that restore the previous schema, executed in order.
    fn down(&self, dialect: Dialect) -> &'static [&'static str];

    /// Statements for the given direction.
    fn statements(&self, dialect: Dialect, direction: Direction) -> &'static [&'static str] {
        match direction {
            Direction::Up => self.up(dialect),
            Direction::Down => self.down(dialect),
        }
    }
}

/// Every migration shipped with this build, in version order.
pub fn all() -> Vec<Box<dyn Migration>> {
    vec![Box::new(CreateMcpTables), Box::new(CreateMcpPieceTable)]
}
