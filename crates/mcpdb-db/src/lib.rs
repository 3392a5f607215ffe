#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod factory;
pub mod migrations;
pub mod repositories;
pub mod schema_check;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

pub use migrations::{
    AppliedMigration, Direction, Migration, MigrationConnection, MigrationError, MigrationState,
    MigrationStatus, Migrator,
};
pub use repositories::SqliteMcpRepository;
pub use schema_check::{SchemaDrift, VerifyError, verify_sqlite_schema};

// Re-export setup functions for convenient access
pub use setup::{DatabasePool, connect, setup_database};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
