//! Fixtures shared by the migration integration tests.

#![allow(dead_code)]

use mcpdb_db::Migrator;
use mcpdb_db::migrations::CreateMcpTables;
use mcpdb_db::Migration;
use sqlx::sqlite::{SqliteConnection, SqlitePoolOptions};
use sqlx::SqlitePool;

/// In-memory database on a single long-lived connection.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// Migrate to the schema before `mcp_piece` existed.
pub async fn migrate_to_baseline(conn: &mut SqliteConnection) {
    Migrator::default()
        .run_to(conn, CreateMcpTables.version())
        .await
        .unwrap();
}

pub async fn insert_mcp(conn: &mut SqliteConnection, id: &str) {
    sqlx::query(r#"INSERT INTO "mcp" ("id", "projectId", "token") VALUES (?, ?, ?)"#)
        .bind(id)
        .bind(format!("{:p<21}", &id[..4]))
        .bind(format!("{:t<21}", &id[..4]))
        .execute(conn)
        .await
        .unwrap();
}

/// Insert a pre-migration connection.
pub async fn insert_legacy_connection(
    conn: &mut SqliteConnection,
    id: &str,
    piece_name: &str,
    mcp_id: Option<&str>,
    created: &str,
) {
    sqlx::query(
        r#"
        INSERT INTO "app_connection" (
            "id", "created", "updated", "pieceName", "value", "type", "displayName",
            "externalId", "platformId", "projectIds", "scope", "mcpId"
        )
        VALUES (?, ?, ?, ?, '{"secret_text":"x"}', 'SECRET_TEXT', ?, ?, 'platform', '["p"]', 'PROJECT', ?)
        "#,
    )
    .bind(id)
    .bind(created)
    .bind(created)
    .bind(piece_name)
    .bind(format!("{piece_name} ({id})"))
    .bind(id)
    .bind(mcp_id)
    .execute(conn)
    .await
    .unwrap();
}

pub async fn count(conn: &mut SqliteConnection, sql: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(sql).fetch_one(conn).await.unwrap();
    count
}

pub async fn has_column(conn: &mut SqliteConnection, table: &str, column: &str) -> bool {
    let (count,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM pragma_table_info(?) WHERE "name" = ?"#)
            .bind(table)
            .bind(column)
            .fetch_one(conn)
            .await
            .unwrap();
    count == 1
}

pub async fn has_table(conn: &mut SqliteConnection, table: &str) -> bool {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(conn)
            .await
            .unwrap();
    count == 1
}

pub async fn has_index(conn: &mut SqliteConnection, index: &str) -> bool {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?")
            .bind(index)
            .fetch_one(conn)
            .await
            .unwrap();
    count == 1
}

/// A readable 21-character id: `prefix` padded with zeros.
pub fn fixed_id(prefix: &str) -> String {
    format!("{prefix:0<21}")
}
