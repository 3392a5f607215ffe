//! Entity schema descriptors.
//!
//! Static metadata for the tables the MCP feature reads and writes: columns,
//! indices and relations. The data-access layer and the schema verifier in
//! `mcpdb-db` consume these; they contain no executable logic.

mod entities;
mod types;

pub use entities::{APP_CONNECTION_ENTITY, ENTITIES, MCP_ENTITY, MCP_PIECE_ENTITY};
pub use types::{
    ColumnSchema, ColumnType, EntitySchema, ForeignKey, IndexSchema, OnDelete, RelationKind,
    RelationSchema,
};
