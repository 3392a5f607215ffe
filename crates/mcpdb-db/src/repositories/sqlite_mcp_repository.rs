//! `SQLite` implementation of the MCP repository.
//!
//! Operates on the schema left by the `CreateMcpPieceTable` migration: the
//! piece owns `connectionId` and the connection points back through
//! `mcpPieceId`. Both sides are written in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use mcpdb_core::domain::{
    ApId, AppConnectionStatus, AppConnectionSummary, Mcp, McpPiece, McpPieceWithConnection,
    UpsertMcpPiece,
};
use mcpdb_core::ports::{McpRepository, McpRepositoryError};

/// `SQLite` implementation of the MCP repository.
pub struct SqliteMcpRepository {
    pool: SqlitePool,
}

impl SqliteMcpRepository {
    /// Create a new `SQLite` MCP repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct McpRow {
    id: String,
    created: String,
    updated: String,
    #[sqlx(rename = "projectId")]
    project_id: String,
    token: String,
}

#[derive(sqlx::FromRow)]
struct McpPieceRow {
    id: String,
    created: String,
    updated: String,
    #[sqlx(rename = "pieceName")]
    piece_name: String,
    #[sqlx(rename = "mcpId")]
    mcp_id: String,
    #[sqlx(rename = "connectionId")]
    connection_id: Option<String>,
}

#[derive(sqlx::FromRow)]
struct McpPieceWithConnectionRow {
    #[sqlx(flatten)]
    piece: McpPieceRow,
    #[sqlx(rename = "connectionDisplayName")]
    connection_display_name: Option<String>,
    #[sqlx(rename = "connectionPieceName")]
    connection_piece_name: Option<String>,
    #[sqlx(rename = "connectionStatus")]
    connection_status: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a datetime string from `SQLite` to a `DateTime<Utc>`.
///
/// Accepts `datetime('now')` output as well as the millisecond timestamps
/// carried over from `app_connection` by the piece migration.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, McpRepositoryError> {
    let trimmed = s.trim_end_matches(" UTC");
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .map_err(|e| McpRepositoryError::Internal(format!("Stored timestamp '{s}' is invalid: {e}")))
}

fn parse_id(value: &str) -> Result<ApId, McpRepositoryError> {
    ApId::parse(value)
        .map_err(|e| McpRepositoryError::Internal(format!("Stored id '{value}' is invalid: {e}")))
}

fn row_to_mcp(row: McpRow) -> Result<Mcp, McpRepositoryError> {
    Ok(Mcp {
        id: parse_id(&row.id)?,
        created: parse_datetime(&row.created)?,
        updated: parse_datetime(&row.updated)?,
        project_id: parse_id(&row.project_id)?,
        token: parse_id(&row.token)?,
    })
}

fn row_to_piece(row: McpPieceRow) -> Result<McpPiece, McpRepositoryError> {
    Ok(McpPiece {
        id: parse_id(&row.id)?,
        created: parse_datetime(&row.created)?,
        updated: parse_datetime(&row.updated)?,
        piece_name: row.piece_name,
        mcp_id: parse_id(&row.mcp_id)?,
        connection_id: row.connection_id.as_deref().map(parse_id).transpose()?,
    })
}

fn row_to_piece_with_connection(
    row: McpPieceWithConnectionRow,
) -> Result<McpPieceWithConnection, McpRepositoryError> {
    let piece = row_to_piece(row.piece)?;

    // The LEFT JOIN yields NULLs when the claimed connection has no row
    let connection = match (
        piece.connection_id.clone(),
        row.connection_display_name,
        row.connection_piece_name,
        row.connection_status,
    ) {
        (Some(id), Some(display_name), Some(piece_name), Some(status)) => {
            Some(AppConnectionSummary {
                id,
                display_name,
                piece_name,
                status: status
                    .parse::<AppConnectionStatus>()
                    .map_err(McpRepositoryError::Internal)?,
            })
        }
        _ => None,
    };

    Ok(McpPieceWithConnection { piece, connection })
}

/// Map `SQLx` errors to `McpRepositoryError`.
fn map_sqlx_error(e: sqlx::Error) -> McpRepositoryError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return McpRepositoryError::Conflict(db.message().to_string());
        }
    }
    McpRepositoryError::Internal(e.to_string())
}

const SELECT_MCP: &str = r#"
    SELECT "id", "created", "updated", "projectId", "token"
    FROM "mcp"
"#;

const SELECT_PIECE: &str = r#"
    SELECT "id", "created", "updated", "pieceName", "mcpId", "connectionId"
    FROM "mcp_piece"
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl McpRepository for SqliteMcpRepository {
    async fn create(&self, project_id: &ApId) -> Result<Mcp, McpRepositoryError> {
        let id = ApId::generate();

        sqlx::query(r#"INSERT INTO "mcp" ("id", "projectId", "token") VALUES (?, ?, ?)"#)
            .bind(id.as_str())
            .bind(project_id.as_str())
            .bind(ApId::generate().as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error(e) {
                McpRepositoryError::Conflict(_) => {
                    McpRepositoryError::Conflict(format!("Project {project_id} already has an MCP"))
                }
                other => other,
            })?;

        self.get_by_id(&id).await
    }

    async fn get_by_id(&self, id: &ApId) -> Result<Mcp, McpRepositoryError> {
        let row = sqlx::query_as::<_, McpRow>(&format!(r#"{SELECT_MCP} WHERE "id" = ?"#))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| McpRepositoryError::NotFound(format!("MCP {id}")))?;

        row_to_mcp(row)
    }

    async fn get_by_project(&self, project_id: &ApId) -> Result<Mcp, McpRepositoryError> {
        let row = sqlx::query_as::<_, McpRow>(&format!(r#"{SELECT_MCP} WHERE "projectId" = ?"#))
            .bind(project_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| McpRepositoryError::NotFound(format!("MCP of project {project_id}")))?;

        row_to_mcp(row)
    }

    async fn rotate_token(&self, id: &ApId) -> Result<Mcp, McpRepositoryError> {
        let result = sqlx::query(
            r#"UPDATE "mcp" SET "token" = ?, "updated" = datetime('now') WHERE "id" = ?"#,
        )
        .bind(ApId::generate().as_str())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(McpRepositoryError::NotFound(format!("MCP {id}")));
        }

        self.get_by_id(id).await
    }

    async fn delete(&self, id: &ApId) -> Result<(), McpRepositoryError> {
        // Pieces (and the connections they claim) go via ON DELETE CASCADE
        let result = sqlx::query(r#"DELETE FROM "mcp" WHERE "id" = ?"#)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(McpRepositoryError::NotFound(format!("MCP {id}")));
        }

        Ok(())
    }

    async fn upsert_piece(&self, piece: UpsertMcpPiece) -> Result<McpPiece, McpRepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        ensure_exists(&mut tx, "mcp", &piece.mcp_id).await?;
        if let Some(connection_id) = &piece.connection_id {
            ensure_exists(&mut tx, "app_connection", connection_id).await?;
        }

        let existing = sqlx::query_as::<_, McpPieceRow>(&format!(
            r#"{SELECT_PIECE} WHERE "mcpId" = ? AND "pieceName" = ?"#
        ))
        .bind(piece.mcp_id.as_str())
        .bind(&piece.piece_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(connection_id) = &piece.connection_id {
            let claimed_by: Option<(String,)> =
                sqlx::query_as(r#"SELECT "id" FROM "mcp_piece" WHERE "connectionId" = ?"#)
                    .bind(connection_id.as_str())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;

            let own_id = existing.as_ref().map(|row| row.id.as_str());
            if let Some((other,)) = claimed_by {
                if Some(other.as_str()) != own_id {
                    return Err(McpRepositoryError::Conflict(format!(
                        "Connection {connection_id} is already used by piece {other}"
                    )));
                }
            }
        }

        let piece_id = match existing {
            Some(row) => {
                sqlx::query(
                    r#"UPDATE "mcp_piece" SET "connectionId" = ?, "updated" = datetime('now') WHERE "id" = ?"#,
                )
                .bind(piece.connection_id.as_ref().map(ApId::as_str))
                .bind(&row.id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

                // Release the connection this piece used to claim
                let previous = row.connection_id.as_deref();
                if previous.is_some() && previous != piece.connection_id.as_ref().map(ApId::as_str)
                {
                    sqlx::query(
                        r#"UPDATE "app_connection" SET "mcpPieceId" = NULL WHERE "id" = ?"#,
                    )
                    .bind(previous)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }

                row.id
            }
            None => {
                let id = ApId::generate();
                sqlx::query(
                    r#"INSERT INTO "mcp_piece" ("id", "pieceName", "mcpId", "connectionId") VALUES (?, ?, ?, ?)"#,
                )
                .bind(id.as_str())
                .bind(&piece.piece_name)
                .bind(piece.mcp_id.as_str())
                .bind(piece.connection_id.as_ref().map(ApId::as_str))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

                id.into()
            }
        };

        if let Some(connection_id) = &piece.connection_id {
            sqlx::query(r#"UPDATE "app_connection" SET "mcpPieceId" = ? WHERE "id" = ?"#)
                .bind(&piece_id)
                .bind(connection_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        let row = sqlx::query_as::<_, McpPieceRow>(&format!(r#"{SELECT_PIECE} WHERE "id" = ?"#))
            .bind(&piece_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        row_to_piece(row)
    }

    async fn list_pieces(
        &self,
        mcp_id: &ApId,
    ) -> Result<Vec<McpPieceWithConnection>, McpRepositoryError> {
        let rows = sqlx::query_as::<_, McpPieceWithConnectionRow>(
            r#"
            SELECT
                mp."id", mp."created", mp."updated", mp."pieceName", mp."mcpId", mp."connectionId",
                ac."displayName" AS "connectionDisplayName",
                ac."pieceName" AS "connectionPieceName",
                ac."status" AS "connectionStatus"
            FROM "mcp_piece" mp
            LEFT JOIN "app_connection" ac ON ac."id" = mp."connectionId"
            WHERE mp."mcpId" = ?
            ORDER BY mp."pieceName"
            "#,
        )
        .bind(mcp_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(row_to_piece_with_connection).collect()
    }

    async fn delete_piece(&self, id: &ApId) -> Result<(), McpRepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "mcp_piece" WHERE "id" = ?"#)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(McpRepositoryError::NotFound(format!("MCP piece {id}")));
        }

        Ok(())
    }
}

/// Fail with `NotFound` unless `table` has a row with the given id.
async fn ensure_exists(
    tx: &mut Transaction<'_, Sqlite>,
    table: &'static str,
    id: &ApId,
) -> Result<(), McpRepositoryError> {
    let found: Option<(i64,)> = sqlx::query_as(&format!(r#"SELECT 1 FROM "{table}" WHERE "id" = ?"#))
        .bind(id.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

    found
        .map(|_| ())
        .ok_or_else(|| McpRepositoryError::NotFound(format!("{table} {id}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
