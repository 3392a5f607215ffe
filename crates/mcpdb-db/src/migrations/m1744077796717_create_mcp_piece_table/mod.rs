//! Moves the MCP/connection association out of `app_connection.mcpId` and
//! into the `mcp_piece` join table.
//!
//! Going up, connections sharing an (`mcpId`, `pieceName`) pair are first
//! collapsed to the earliest created one, then every surviving connection
//! with an MCP gets one backfilled `mcp_piece` row and points back at it
//! through `app_connection.mcpPieceId`.
//!
//! Ties on `created` keep the first inserted row on `SQLite` (`rowid`).
//! Postgres has no stable insertion-order column (`ctid` moves on update),
//! so ties there keep the smallest `id` instead: deterministic, but not
//! insertion order.
//!
//! Going down restores `app_connection.mcpId` from the linked piece. Pieces
//! that have no connection are dropped with the table.

mod postgres;
mod sqlite;

use mcpdb_core::Dialect;

use super::Migration;

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateMcpPieceTable;

impl Migration for CreateMcpPieceTable {
    fn version(&self) -> i64 {
        1_744_077_796_717
    }

    fn name(&self) -> &'static str {
        "CreateMcpPieceTable1744077796717"
    }

    fn up(&self, dialect: Dialect) -> &'static [&'static str] {
        match dialect {
            Dialect::Postgres => postgres::UP,
            Dialect::Sqlite => sqlite::UP,
        }
    }

    fn down(&self, dialect: Dialect) -> &'static [&'static str] {
        match dialect {
            Dialect::Postgres => postgres::DOWN,
            Dialect::Sqlite => sqlite::DOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(statements: &[&str], needle: &str) -> usize {
        statements
            .iter()
            .position(|s| s.contains(needle))
            .unwrap_or_else(|| panic!("no statement contains {needle}"))
    }

    #[test]
    fn test_up_deduplicates_before_creating_unique_index() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let up = CreateMcpPieceTable.up(dialect);
            assert_eq!(position(up, "ROW_NUMBER()"), 0, "{dialect}");
            assert!(
                position(up, "ROW_NUMBER()")
                    < position(up, r#""idx_mcp_piece_mcp_id_piece_name""#)
            );
        }
    }

    #[test]
    fn test_dedup_tie_break_per_dialect() {
        let sqlite = CreateMcpPieceTable.up(Dialect::Sqlite);
        assert!(sqlite[0].contains(r#"ORDER BY "created" ASC, rowid ASC"#));

        let postgres = CreateMcpPieceTable.up(Dialect::Postgres);
        assert!(postgres[0].contains(r#"ORDER BY "created" ASC, "id" ASC"#));
    }

    #[test]
    fn test_up_backfills_before_linking_connections() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let up = CreateMcpPieceTable.up(dialect);
            let backfill = position(up, r#"INSERT INTO "mcp_piece""#);
            let create = position(up, r#"CREATE TABLE "mcp_piece""#);
            assert!(create < backfill, "{dialect}");
        }
    }

    #[test]
    fn test_postgres_alters_in_place() {
        let up = CreateMcpPieceTable.up(Dialect::Postgres);
        assert!(up.iter().all(|s| !s.contains("temp_app_connection")));
        assert!(
            position(up, r#"ADD CONSTRAINT "fk_app_connection_mcp_piece_id""#)
                < position(up, r#"DROP COLUMN IF EXISTS "mcpId""#)
        );
        assert_eq!(up.iter().filter(|s| s.contains("ON DELETE CASCADE")).count(), 3);
    }

    #[test]
    fn test_sqlite_rebuilds_app_connection() {
        let up = CreateMcpPieceTable.up(Dialect::Sqlite);
        let create = position(up, r#"CREATE TABLE "temp_app_connection""#);
        let drop = position(up, r#"DROP TABLE "app_connection""#);
        let rename = position(up, r#"RENAME TO "app_connection""#);
        assert!(create < drop && drop < rename);
        assert!(up.iter().all(|s| !s.contains("ALTER TABLE \"app_connection\" DROP")));
        assert!(!up[create].contains(r#""mcpId""#));
    }

    #[test]
    fn test_down_restores_old_index_and_drops_table_last() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let down = CreateMcpPieceTable.down(dialect);
            assert!(
                down.iter()
                    .any(|s| s.contains(r#"CREATE INDEX "idx_app_connection_mcp_id""#))
            );
            assert!(down.last().unwrap().contains(r#"DROP TABLE IF EXISTS "mcp_piece""#));
        }
    }
}
