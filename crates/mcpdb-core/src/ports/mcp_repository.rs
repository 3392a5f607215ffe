//! MCP repository trait and error types.
//!
//! This module defines the repository abstraction for MCP persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ApId, Mcp, McpPiece, McpPieceWithConnection, UpsertMcpPiece};

/// Domain-specific errors for MCP repository operations.
///
/// This error type abstracts away storage implementation details and provides
/// a clean interface for services to handle MCP storage failures.
#[derive(Debug, Error)]
pub enum McpRepositoryError {
    /// The requested row was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage backend error (database, etc.).
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Repository trait for MCPs and their pieces.
///
/// # Design Rules
///
/// - Constraint: one MCP per project
/// - Constraint: one piece per (`mcp_id`, `piece_name`)
/// - Constraint: a connection is claimed by at most one piece
/// - Deleting an MCP deletes its pieces; deleting a piece deletes the
///   connection it claims (both enforced by `ON DELETE CASCADE`)
///
/// # Example
///
/// ```ignore
/// let mcp = repo.create(project_id).await?;
/// let piece = repo
///     .upsert_piece(UpsertMcpPiece::new(mcp.id.clone(), "piece-slack").with_connection(conn_id))
///     .await?;
/// let pieces = repo.list_pieces(&mcp.id).await?;
/// ```
#[async_trait]
pub trait McpRepository: Send + Sync {
    /// Create the MCP of a project with a fresh id and token.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the project already has an MCP
    /// - `Internal` for storage errors
    async fn create(&self, project_id: &ApId) -> Result<Mcp, McpRepositoryError>;

    /// Get an MCP by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no MCP with the given id exists
    async fn get_by_id(&self, id: &ApId) -> Result<Mcp, McpRepositoryError>;

    /// Get the MCP of a project.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project has no MCP
    async fn get_by_project(&self, project_id: &ApId) -> Result<Mcp, McpRepositoryError>;

    /// Replace the access token and return the updated MCP.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no MCP with the given id exists
    async fn rotate_token(&self, id: &ApId) -> Result<Mcp, McpRepositoryError>;

    /// Delete an MCP together with its pieces.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no MCP with the given id exists
    async fn delete(&self, id: &ApId) -> Result<(), McpRepositoryError>;

    /// Create or update the piece identified by (`mcp_id`, `piece_name`).
    ///
    /// The claimed connection's back reference (`mcpPieceId`) is kept in
    /// step: it is set on the new connection and cleared on the one the
    /// piece previously claimed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the MCP or the connection does not exist
    /// - `Conflict` if another piece already claims the connection
    async fn upsert_piece(&self, piece: UpsertMcpPiece) -> Result<McpPiece, McpRepositoryError>;

    /// List the pieces of an MCP ordered by piece name.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage errors
    async fn list_pieces(
        &self,
        mcp_id: &ApId,
    ) -> Result<Vec<McpPieceWithConnection>, McpRepositoryError>;

    /// Delete a piece.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no piece with the given id exists
    async fn delete_piece(&self, id: &ApId) -> Result<(), McpRepositoryError>;
}
