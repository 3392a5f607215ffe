//! Baseline: `mcp` and `app_connection`, with connections pointing straight
//! at their MCP through `app_connection.mcpId`.

mod postgres;
mod sqlite;

use mcpdb_core::Dialect;

use super::Migration;

/// Creates the tables that [`super::CreateMcpPieceTable`] later reshapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateMcpTables;

impl Migration for CreateMcpTables {
    fn version(&self) -> i64 {
        1_743_465_600_000
    }

    fn name(&self) -> &'static str {
        "CreateMcpTables1743465600000"
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

    #[test]
    fn test_both_dialects_create_the_old_mcp_index() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let up = CreateMcpTables.up(dialect);
            assert!(
                up.iter()
                    .any(|s| s.contains(r#"CREATE INDEX "idx_app_connection_mcp_id""#)),
                "{dialect}"
            );
            assert!(up.iter().any(|s| s.contains(r#""mcp_project_id""#)), "{dialect}");
        }
    }

    #[test]
    fn test_down_drops_connections_before_mcp() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let down = CreateMcpTables.down(dialect);
            let connection = down
                .iter()
                .position(|s| s.contains(r#""app_connection""#))
                .unwrap();
            let mcp = down.iter().position(|s| s.contains(r#""mcp""#)).unwrap();
            assert!(connection < mcp, "{dialect}");
        }
    }
}
