#![doc = include_str!("../README.md")]

pub mod config;
pub mod domain;
pub mod paths;
pub mod ports;
pub mod schema;

// Re-export commonly used types for convenience
pub use config::{ConfigError, DatabaseConfig, Dialect};
pub use domain::{
    ApId, AppConnectionStatus, AppConnectionSummary, IdError, Mcp, McpPiece,
    McpPieceWithConnection, UpsertMcpPiece,
};
pub use paths::{PathError, data_root, database_path};
pub use ports::{McpRepository, McpRepositoryError};
pub use schema::{
    APP_CONNECTION_ENTITY, ColumnSchema, ColumnType, ENTITIES, EntitySchema, IndexSchema,
    MCP_ENTITY, MCP_PIECE_ENTITY, OnDelete, RelationKind, RelationSchema,
};
