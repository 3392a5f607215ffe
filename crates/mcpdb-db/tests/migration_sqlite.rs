//! End-to-end behavior of the `mcp_piece` migration on `SQLite`.

mod common;

use common::{
    count, fixed_id, has_column, has_index, has_table, insert_legacy_connection, insert_mcp,
    memory_pool, migrate_to_baseline,
};
use chrono::{TimeZone, Utc};
use mcpdb_core::domain::ApId;
use mcpdb_core::ports::McpRepository;
use mcpdb_core::schema::ENTITIES;
use mcpdb_db::migrations::{CreateMcpPieceTable, CreateMcpTables};
use mcpdb_db::{
    Migration, MigrationError, Migrator, SchemaDrift, SqliteMcpRepository, verify_sqlite_schema,
};
use sqlx::sqlite::SqliteConnection;

/// Three Slack connections for one MCP, inserted out of chronological order,
/// plus one Gmail connection and one connection outside any MCP.
async fn seed_duplicates(conn: &mut SqliteConnection) -> (String, String) {
    let mcp = fixed_id("mcp1");
    insert_mcp(conn, &mcp).await;

    insert_legacy_connection(conn, &fixed_id("slack2"), "piece-slack", Some(&mcp), "2025-04-02 09:00:00").await;
    insert_legacy_connection(conn, &fixed_id("slack1"), "piece-slack", Some(&mcp), "2025-04-01 09:00:00").await;
    insert_legacy_connection(conn, &fixed_id("slack3"), "piece-slack", Some(&mcp), "2025-04-03 09:00:00").await;
    insert_legacy_connection(conn, &fixed_id("gmail"), "piece-gmail", Some(&mcp), "2025-04-01 12:00:00").await;
    insert_legacy_connection(conn, &fixed_id("free"), "piece-slack", None, "2025-03-01 08:00:00").await;

    (mcp, fixed_id("slack1"))
}

#[tokio::test]
async fn test_up_keeps_one_piece_per_mcp_and_piece_name() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    let (mcp, earliest) = seed_duplicates(&mut conn).await;

    let applied = Migrator::default().run(&mut *conn).await.unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, CreateMcpPieceTable.version());

    let duplicates = count(
        &mut conn,
        r#"SELECT COUNT(*) FROM (
            SELECT "mcpId", "pieceName" FROM "mcp_piece"
            GROUP BY "mcpId", "pieceName" HAVING COUNT(*) > 1
        )"#,
    )
    .await;
    assert_eq!(duplicates, 0);
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "mcp_piece""#).await, 2);

    // Only the earliest Slack connection survives
    let slack: Vec<(String,)> = sqlx::query_as(
        r#"SELECT "id" FROM "app_connection" WHERE "pieceName" = 'piece-slack' AND "mcpPieceId" IS NOT NULL"#,
    )
    .fetch_all(&mut *conn)
    .await
    .unwrap();
    assert_eq!(slack, vec![(earliest.clone(),)]);

    let (piece_mcp, connection_id): (String, String) = sqlx::query_as(
        r#"SELECT "mcpId", "connectionId" FROM "mcp_piece" WHERE "pieceName" = 'piece-slack'"#,
    )
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(piece_mcp, mcp);
    assert_eq!(connection_id, earliest);
}

#[tokio::test]
async fn test_up_links_every_connection_that_had_an_mcp() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    seed_duplicates(&mut conn).await;

    Migrator::default().run(&mut *conn).await.unwrap();

    // Surviving connections: slack1, gmail, free
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "app_connection""#).await, 3);

    let (mismatched,): (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM "app_connection" ac
           LEFT JOIN "mcp_piece" mp ON mp."id" = ac."mcpPieceId"
           WHERE ac."id" != ? AND (
               mp."id" IS NULL
               OR mp."connectionId" != ac."id"
               OR mp."pieceName" != ac."pieceName"
           )"#,
    )
    .bind(fixed_id("free"))
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(mismatched, 0);

    let (free_piece,): (Option<String>,) =
        sqlx::query_as(r#"SELECT "mcpPieceId" FROM "app_connection" WHERE "id" = ?"#)
            .bind(fixed_id("free"))
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(free_piece, None);

    assert!(!has_column(&mut conn, "app_connection", "mcpId").await);
    assert!(has_column(&mut conn, "app_connection", "mcpPieceId").await);
    assert!(!has_index(&mut conn, "idx_app_connection_mcp_id").await);
    assert!(has_index(&mut conn, "idx_app_connection_mcp_piece_id").await);
}

#[tokio::test]
async fn test_up_preserves_connection_columns() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    seed_duplicates(&mut conn).await;

    Migrator::default().run(&mut *conn).await.unwrap();

    let (value, display_name, created, status): (String, String, String, String) = sqlx::query_as(
        r#"SELECT "value", "displayName", "created", "status" FROM "app_connection" WHERE "id" = ?"#,
    )
    .bind(fixed_id("gmail"))
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(value, r#"{"secret_text":"x"}"#);
    assert_eq!(display_name, format!("piece-gmail ({})", fixed_id("gmail")));
    assert_eq!(created, "2025-04-01 12:00:00");
    assert_eq!(status, "ACTIVE");

    // Backfilled pieces copy the connection's timestamps and get fresh ids
    let (piece_id, piece_created): (String, String) = sqlx::query_as(
        r#"SELECT "id", "created" FROM "mcp_piece" WHERE "connectionId" = ?"#,
    )
    .bind(fixed_id("gmail"))
    .fetch_one(&mut *conn)
    .await
    .unwrap();
    assert_eq!(piece_created, "2025-04-01 12:00:00");
    assert!(mcpdb_core::ApId::parse(&piece_id).is_ok());
}

#[tokio::test]
async fn test_equal_timestamps_keep_first_inserted() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;

    let mcp = fixed_id("mcp1");
    insert_mcp(&mut conn, &mcp).await;
    for name in ["b", "a", "c"] {
        insert_legacy_connection(&mut conn, &fixed_id(name), "piece-slack", Some(&mcp), "2025-04-01 09:00:00").await;
    }

    Migrator::default().run(&mut *conn).await.unwrap();

    let (survivor,): (String,) = sqlx::query_as(r#"SELECT "id" FROM "app_connection""#)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(survivor, fixed_id("b"));
}

#[tokio::test]
async fn test_connection_claimed_by_at_most_one_piece() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    let (mcp, earliest) = seed_duplicates(&mut conn).await;
    Migrator::default().run(&mut *conn).await.unwrap();

    let result = sqlx::query(
        r#"INSERT INTO "mcp_piece" ("id", "pieceName", "mcpId", "connectionId") VALUES (?, 'piece-other', ?, ?)"#,
    )
    .bind(fixed_id("piece9"))
    .bind(&mcp)
    .bind(&earliest)
    .execute(&mut *conn)
    .await;

    let err = result.unwrap_err();
    assert!(err.as_database_error().unwrap().is_unique_violation());
}

#[tokio::test]
async fn test_deleting_mcp_cascades() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    let (mcp, _) = seed_duplicates(&mut conn).await;
    Migrator::default().run(&mut *conn).await.unwrap();

    sqlx::query(r#"DELETE FROM "mcp" WHERE "id" = ?"#)
        .bind(&mcp)
        .execute(&mut *conn)
        .await
        .unwrap();

    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "mcp_piece""#).await, 0);
    assert_eq!(
        count(&mut conn, r#"SELECT COUNT(*) FROM "app_connection" WHERE "mcpPieceId" IS NOT NULL"#).await,
        0
    );
    // The connection outside any MCP is untouched
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "app_connection""#).await, 1);
}

#[tokio::test]
async fn test_up_then_down_restores_mcp_id() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    let (mcp, earliest) = seed_duplicates(&mut conn).await;

    let migrator = Migrator::default();
    migrator.run(&mut *conn).await.unwrap();
    let reverted = migrator.revert_last(&mut *conn).await.unwrap().unwrap();
    assert_eq!(reverted.version, CreateMcpPieceTable.version());

    assert!(!has_table(&mut conn, "mcp_piece").await);
    assert!(has_column(&mut conn, "app_connection", "mcpId").await);
    assert!(!has_column(&mut conn, "app_connection", "mcpPieceId").await);
    assert!(has_index(&mut conn, "idx_app_connection_mcp_id").await);
    assert!(!has_index(&mut conn, "idx_mcp_piece_mcp_id").await);

    // The three Slack connections stay collapsed into the earliest one
    let slack: Vec<(String, Option<String>, String)> = sqlx::query_as(
        r#"SELECT "id", "mcpId", "created" FROM "app_connection" WHERE "pieceName" = 'piece-slack' ORDER BY "created""#,
    )
    .fetch_all(&mut *conn)
    .await
    .unwrap();
    assert_eq!(
        slack,
        vec![
            (fixed_id("free"), None, "2025-03-01 08:00:00".to_string()),
            (earliest, Some(mcp.clone()), "2025-04-01 09:00:00".to_string()),
        ]
    );

    let (gmail_mcp,): (Option<String>,) =
        sqlx::query_as(r#"SELECT "mcpId" FROM "app_connection" WHERE "id" = ?"#)
            .bind(fixed_id("gmail"))
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(gmail_mcp, Some(mcp));

    // And the forward migration can be applied again
    migrator.run(&mut *conn).await.unwrap();
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "mcp_piece""#).await, 2);
}

#[tokio::test]
async fn test_down_drops_pieces_without_connection() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    let (mcp, _) = seed_duplicates(&mut conn).await;

    let migrator = Migrator::default();
    migrator.run(&mut *conn).await.unwrap();
    sqlx::query(r#"INSERT INTO "mcp_piece" ("id", "pieceName", "mcpId") VALUES (?, 'piece-http', ?)"#)
        .bind(fixed_id("http"))
        .bind(&mcp)
        .execute(&mut *conn)
        .await
        .unwrap();

    migrator.revert_last(&mut *conn).await.unwrap();

    // Lossy: the connection-less piece has nowhere to go
    let http = count(
        &mut conn,
        r#"SELECT COUNT(*) FROM "app_connection" WHERE "pieceName" = 'piece-http'"#,
    )
    .await;
    assert_eq!(http, 0);
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "app_connection""#).await, 3);
}

#[tokio::test]
async fn test_orphaned_mcp_id_aborts_migration() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;
    insert_legacy_connection(&mut conn, &fixed_id("orphan"), "piece-slack", Some(&fixed_id("gone")), "2025-04-01 09:00:00").await;

    let err = Migrator::default().run(&mut *conn).await.unwrap_err();
    assert!(matches!(err, MigrationError::ForeignKeyViolation { .. }), "{err}");

    // Nothing from the failed migration is visible
    assert!(!has_table(&mut conn, "mcp_piece").await);
    assert!(has_column(&mut conn, "app_connection", "mcpId").await);
    assert!(has_index(&mut conn, "idx_app_connection_mcp_id").await);
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "migrations""#).await, 1);
    assert_eq!(count(&mut conn, r#"SELECT COUNT(*) FROM "app_connection""#).await, 1);
}

#[tokio::test]
async fn test_schema_matches_descriptors_only_after_up() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    migrate_to_baseline(&mut conn).await;

    let drift = verify_sqlite_schema(&mut conn, ENTITIES).await.unwrap();
    assert!(drift.contains(&SchemaDrift::MissingTable { table: "mcp_piece" }));
    assert!(drift.contains(&SchemaDrift::UnexpectedColumn {
        table: "app_connection",
        column: "mcpId".to_string(),
    }));

    Migrator::default().run(&mut *conn).await.unwrap();
    let drift = verify_sqlite_schema(&mut conn, ENTITIES).await.unwrap();
    assert_eq!(drift, Vec::new());
}

#[tokio::test]
async fn test_status_and_full_revert() {
    let pool = memory_pool().await;
    let mut conn = pool.acquire().await.unwrap();
    let migrator = Migrator::default();

    migrator.run(&mut *conn).await.unwrap();
    let status = migrator.status(&mut *conn).await.unwrap();
    assert_eq!(
        status.iter().map(|s| s.version).collect::<Vec<_>>(),
        vec![CreateMcpTables.version(), CreateMcpPieceTable.version()]
    );

    let reverted = migrator.revert_to(&mut *conn, 0).await.unwrap();
    assert_eq!(
        reverted.iter().map(|m| m.version).collect::<Vec<_>>(),
        vec![CreateMcpPieceTable.version(), CreateMcpTables.version()]
    );
    assert!(!has_table(&mut conn, "mcp").await);
    assert!(!has_table(&mut conn, "app_connection").await);
    assert!(has_table(&mut conn, "migrations").await);
}

#[tokio::test]
async fn test_backfilled_piece_keeps_fractional_timestamps() {
    let pool = memory_pool().await;
    let mcp = fixed_id("mcp1");
    {
        let mut conn = pool.acquire().await.unwrap();
        migrate_to_baseline(&mut conn).await;
        insert_mcp(&mut conn, &mcp).await;
        insert_legacy_connection(
            &mut conn,
            &fixed_id("slack1"),
            "piece-slack",
            Some(&mcp),
            "2025-04-01 09:00:00.123",
        )
        .await;
        Migrator::default().run(&mut *conn).await.unwrap();
    }

    let repo = SqliteMcpRepository::new(pool.clone());
    let pieces = repo.list_pieces(&ApId::parse(&mcp).unwrap()).await.unwrap();
    assert_eq!(pieces.len(), 1);

    let expected = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
        + chrono::Duration::milliseconds(123);
    assert_eq!(pieces[0].piece.created, expected);
    assert_eq!(pieces[0].piece.updated, expected);
}
