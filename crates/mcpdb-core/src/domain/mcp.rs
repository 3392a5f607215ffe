//! MCP domain types.
//!
//! Field names serialize in camelCase to match the column names of the
//! `mcp` and `mcp_piece` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::connection::AppConnectionSummary;
use super::id::ApId;

/// An MCP: the per-project parent of piece configurations.
///
/// Each project owns at most one MCP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcp {
    /// Primary key.
    pub id: ApId,

    /// When the row was created.
    pub created: DateTime<Utc>,

    /// When the row was last modified.
    pub updated: DateTime<Utc>,

    /// Owning project (unique across all MCPs).
    pub project_id: ApId,

    /// Access token presented by MCP clients.
    pub token: ApId,
}

/// A piece configuration belonging to an MCP.
///
/// Constraints enforced by the schema:
/// - (`mcp_id`, `piece_name`) is unique
/// - `connection_id` is unique when present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpPiece {
    pub id: ApId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,

    /// Name of the piece (e.g. `@activepieces/piece-slack`).
    pub piece_name: String,

    /// Owning MCP.
    pub mcp_id: ApId,

    /// Connection claimed by this piece, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ApId>,
}

/// A piece together with the connection it claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpPieceWithConnection {
    #[serde(flatten)]
    pub piece: McpPiece,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<AppConnectionSummary>,
}

/// Write model for creating or replacing the piece of an MCP.
///
/// Pieces are keyed by (`mcp_id`, `piece_name`): writing the same pair twice
/// updates the existing row instead of creating a second one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertMcpPiece {
    pub mcp_id: ApId,
    pub piece_name: String,
    pub connection_id: Option<ApId>,
}

impl UpsertMcpPiece {
    /// Create a write model without a connection.
    pub fn new(mcp_id: ApId, piece_name: impl Into<String>) -> Self {
        Self {
            mcp_id,
            piece_name: piece_name.into(),
            connection_id: None,
        }
    }

    /// Attach a connection.
    #[must_use]
    pub fn with_connection(mut self, connection_id: ApId) -> Self {
        self.connection_id = Some(connection_id);
        self
    }
}
