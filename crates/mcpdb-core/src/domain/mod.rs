//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, filesystem, etc.).
//!
//! # Structure
//!
//! - `id` - The 21-character `ApId` used for every key
//! - `mcp` - `Mcp`, `McpPiece` and the piece write model
//! - `connection` - The read-only connection summary attached to a piece

mod connection;
mod id;
mod mcp;

pub use connection::{AppConnectionStatus, AppConnectionSummary};
pub use id::{AP_ID_LENGTH, ApId, IdError};
pub use mcp::{Mcp, McpPiece, McpPieceWithConnection, UpsertMcpPiece};
