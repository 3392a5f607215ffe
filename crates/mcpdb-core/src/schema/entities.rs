//! Entity descriptors for the MCP tables.
//!
//! These describe the schema after the `CreateMcpPieceTable` migration.
//! `app_connection` no longer carries `mcpId`; it points at its piece
//! through `mcpPieceId` instead.

use super::types::{
    ColumnSchema, ColumnType, EntitySchema, IndexSchema, OnDelete, RelationKind, RelationSchema,
};

const MCP_COLUMNS: &[ColumnSchema] = &[
    ColumnSchema::primary_id(),
    ColumnSchema::required("created", ColumnType::Timestamp),
    ColumnSchema::required("updated", ColumnType::Timestamp),
    ColumnSchema::required("projectId", ColumnType::Id),
    ColumnSchema::required("token", ColumnType::Id),
];

/// `mcp`: one per project, owns its pieces.
pub const MCP_ENTITY: EntitySchema = EntitySchema {
    name: "mcp",
    columns: MCP_COLUMNS,
    indices: &[IndexSchema {
        name: "mcp_project_id",
        columns: &["projectId"],
        unique: true,
    }],
    relations: &[RelationSchema {
        name: "pieces",
        kind: RelationKind::OneToMany,
        target: "mcp_piece",
        join_column: None,
        inverse_side: Some("mcp"),
        on_delete: OnDelete::Cascade,
    }],
};

const MCP_PIECE_COLUMNS: &[ColumnSchema] = &[
    ColumnSchema::primary_id(),
    ColumnSchema::required("created", ColumnType::Timestamp),
    ColumnSchema::required("updated", ColumnType::Timestamp),
    ColumnSchema::required("pieceName", ColumnType::String),
    ColumnSchema::required("mcpId", ColumnType::Id),
    ColumnSchema::optional("connectionId", ColumnType::Id).unique(),
];

/// `mcp_piece`: the join between an MCP and at most one connection.
pub const MCP_PIECE_ENTITY: EntitySchema = EntitySchema {
    name: "mcp_piece",
    columns: MCP_PIECE_COLUMNS,
    indices: &[
        IndexSchema {
            name: "idx_mcp_piece_mcp_id",
            columns: &["mcpId"],
            unique: false,
        },
        IndexSchema {
            name: "idx_mcp_piece_connection_id",
            columns: &["connectionId"],
            unique: false,
        },
        IndexSchema {
            name: "idx_mcp_piece_mcp_id_piece_name",
            columns: &["mcpId", "pieceName"],
            unique: true,
        },
    ],
    relations: &[
        RelationSchema {
            name: "mcp",
            kind: RelationKind::ManyToOne,
            target: "mcp",
            join_column: Some("mcpId"),
            inverse_side: Some("pieces"),
            on_delete: OnDelete::Cascade,
        },
        RelationSchema {
            name: "connection",
            kind: RelationKind::OneToOne,
            target: "app_connection",
            join_column: Some("connectionId"),
            inverse_side: None,
            on_delete: OnDelete::Cascade,
        },
    ],
};

const APP_CONNECTION_COLUMNS: &[ColumnSchema] = &[
    ColumnSchema::primary_id(),
    ColumnSchema::required("created", ColumnType::Timestamp),
    ColumnSchema::required("updated", ColumnType::Timestamp),
    ColumnSchema::required("pieceName", ColumnType::String),
    ColumnSchema::required("value", ColumnType::Json),
    ColumnSchema::required("type", ColumnType::String),
    ColumnSchema::required("status", ColumnType::String),
    ColumnSchema::optional("ownerId", ColumnType::String),
    ColumnSchema::required("displayName", ColumnType::String),
    ColumnSchema::required("externalId", ColumnType::String),
    ColumnSchema::required("platformId", ColumnType::String),
    ColumnSchema::required("projectIds", ColumnType::Json),
    ColumnSchema::required("scope", ColumnType::String),
    ColumnSchema::optional("mcpPieceId", ColumnType::Id),
];

/// `app_connection` as seen by the MCP feature.
pub const APP_CONNECTION_ENTITY: EntitySchema = EntitySchema {
    name: "app_connection",
    columns: APP_CONNECTION_COLUMNS,
    indices: &[IndexSchema {
        name: "idx_app_connection_mcp_piece_id",
        columns: &["mcpPieceId"],
        unique: false,
    }],
    relations: &[RelationSchema {
        name: "mcpPiece",
        kind: RelationKind::OneToOne,
        target: "mcp_piece",
        join_column: Some("mcpPieceId"),
        inverse_side: None,
        on_delete: OnDelete::Cascade,
    }],
};

/// Every entity, parents before children.
pub const ENTITIES: &[EntitySchema] = &[MCP_ENTITY, APP_CONNECTION_ENTITY, MCP_PIECE_ENTITY];
