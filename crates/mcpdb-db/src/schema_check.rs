//! Compare entity descriptors against a live `SQLite` schema.
//!
//! The verifier reads `sqlite_master` and the `pragma_*` table-valued
//! functions and reports every place where the database disagrees with the
//! descriptors in [`mcpdb_core::schema`]. An empty result means the schema
//! matches.

use std::fmt;

use sqlx::sqlite::SqliteConnection;
use thiserror::Error;

use mcpdb_core::Dialect;
use mcpdb_core::schema::{EntitySchema, OnDelete};

/// Errors raised while verifying a schema.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Only `SQLite` catalogs can be inspected.
    #[error("Schema verification is not supported for {0}")]
    UnsupportedDialect(Dialect),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// One disagreement between a descriptor and the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDrift {
    MissingTable {
        table: &'static str,
    },
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    UnexpectedColumn {
        table: &'static str,
        column: String,
    },
    NullabilityMismatch {
        table: &'static str,
        column: &'static str,
        expected_nullable: bool,
    },
    NotPrimaryKey {
        table: &'static str,
        column: &'static str,
    },
    LengthMismatch {
        table: &'static str,
        column: &'static str,
        expected: usize,
        declared: String,
    },
    MissingUniqueConstraint {
        table: &'static str,
        column: &'static str,
    },
    MissingIndex {
        table: &'static str,
        index: &'static str,
    },
    IndexColumnsMismatch {
        table: &'static str,
        index: &'static str,
        actual: Vec<String>,
    },
    IndexUniquenessMismatch {
        table: &'static str,
        index: &'static str,
        expected_unique: bool,
    },
    MissingForeignKey {
        table: &'static str,
        column: &'static str,
        target: &'static str,
    },
    OnDeleteMismatch {
        table: &'static str,
        column: &'static str,
        expected: OnDelete,
        actual: String,
    },
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable { table } => write!(f, "table {table} is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "{table}.{column} is missing")
            }
            Self::UnexpectedColumn { table, column } => {
                write!(f, "{table}.{column} is not described by the entity")
            }
            Self::NullabilityMismatch {
                table,
                column,
                expected_nullable,
            } => {
                let expected = if *expected_nullable { "nullable" } else { "NOT NULL" };
                write!(f, "{table}.{column} should be {expected}")
            }
            Self::NotPrimaryKey { table, column } => {
                write!(f, "{table}.{column} should be the primary key")
            }
            Self::LengthMismatch {
                table,
                column,
                expected,
                declared,
            } => write!(
                f,
                "{table}.{column} is declared {declared}, expected length {expected}"
            ),
            Self::MissingUniqueConstraint { table, column } => {
                write!(f, "{table}.{column} has no unique constraint")
            }
            Self::MissingIndex { table, index } => write!(f, "index {index} on {table} is missing"),
            Self::IndexColumnsMismatch {
                table,
                index,
                actual,
            } => write!(
                f,
                "index {index} on {table} covers ({}) instead",
                actual.join(", ")
            ),
            Self::IndexUniquenessMismatch {
                table,
                index,
                expected_unique,
            } => {
                let expected = if *expected_unique { "unique" } else { "non-unique" };
                write!(f, "index {index} on {table} should be {expected}")
            }
            Self::MissingForeignKey {
                table,
                column,
                target,
            } => write!(f, "{table}.{column} has no foreign key to {target}"),
            Self::OnDeleteMismatch {
                table,
                column,
                expected,
                actual,
            } => write!(
                f,
                "{table}.{column} deletes with {actual}, expected {expected}"
            ),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ColumnRow {
    name: String,
    #[sqlx(rename = "type")]
    declared_type: String,
    notnull: i64,
    pk: i64,
}

#[derive(sqlx::FromRow)]
struct IndexRow {
    name: String,
    unique: i64,
}

#[derive(sqlx::FromRow)]
struct ForeignKeyRow {
    from: String,
    table: String,
    to: String,
    on_delete: String,
}

/// Check every entity against the database behind `conn`.
///
/// # Errors
///
/// Returns the underlying database error if the catalog cannot be read.
/// Drift itself is not an error; it is returned as data.
pub async fn verify_sqlite_schema(
    conn: &mut SqliteConnection,
    entities: &[EntitySchema],
) -> Result<Vec<SchemaDrift>, sqlx::Error> {
    let mut drift = Vec::new();
    for entity in entities {
        verify_entity(conn, entity, &mut drift).await?;
    }
    Ok(drift)
}

async fn verify_entity(
    conn: &mut SqliteConnection,
    entity: &EntitySchema,
    drift: &mut Vec<SchemaDrift>,
) -> Result<(), sqlx::Error> {
    let table = entity.name;

    let (exists,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;
    if exists == 0 {
        drift.push(SchemaDrift::MissingTable { table });
        return Ok(());
    }

    // Columns
    let columns: Vec<ColumnRow> =
        sqlx::query_as(r#"SELECT "name", "type", "notnull", "pk" FROM pragma_table_info(?)"#)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

    for expected in entity.columns {
        let Some(actual) = columns.iter().find(|c| c.name == expected.name) else {
            drift.push(SchemaDrift::MissingColumn {
                table,
                column: expected.name,
            });
            continue;
        };
        if (actual.notnull == 0) != expected.nullable {
            drift.push(SchemaDrift::NullabilityMismatch {
                table,
                column: expected.name,
                expected_nullable: expected.nullable,
            });
        }
        if expected.primary && actual.pk == 0 {
            drift.push(SchemaDrift::NotPrimaryKey {
                table,
                column: expected.name,
            });
        }
        if let Some(length) = expected.column_type.length() {
            if declared_length(&actual.declared_type) != Some(length) {
                drift.push(SchemaDrift::LengthMismatch {
                    table,
                    column: expected.name,
                    expected: length,
                    declared: actual.declared_type.clone(),
                });
            }
        }
    }
    for actual in &columns {
        if entity.column(&actual.name).is_none() {
            drift.push(SchemaDrift::UnexpectedColumn {
                table,
                column: actual.name.clone(),
            });
        }
    }

    // Indices, including the automatic ones behind UNIQUE constraints
    let indices: Vec<IndexRow> =
        sqlx::query_as(r#"SELECT "name", "unique" FROM pragma_index_list(?)"#)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

    let mut unique_column_sets = Vec::new();
    for index in &indices {
        let covered = index_columns(conn, &index.name).await?;
        if index.unique != 0 {
            unique_column_sets.push(covered.clone());
        }

        let Some(expected) = entity.index(&index.name) else {
            continue;
        };
        if covered.iter().map(String::as_str).ne(expected.columns.iter().copied()) {
            drift.push(SchemaDrift::IndexColumnsMismatch {
                table,
                index: expected.name,
                actual: covered,
            });
        }
        if (index.unique != 0) != expected.unique {
            drift.push(SchemaDrift::IndexUniquenessMismatch {
                table,
                index: expected.name,
                expected_unique: expected.unique,
            });
        }
    }
    for expected in entity.indices {
        if !indices.iter().any(|i| i.name == expected.name) {
            drift.push(SchemaDrift::MissingIndex {
                table,
                index: expected.name,
            });
        }
    }
    for column in entity.columns.iter().filter(|c| c.unique) {
        let covered = unique_column_sets
            .iter()
            .any(|set| set.len() == 1 && set[0] == column.name);
        if !covered {
            drift.push(SchemaDrift::MissingUniqueConstraint {
                table,
                column: column.name,
            });
        }
    }

    // Foreign keys
    let foreign_keys: Vec<ForeignKeyRow> = sqlx::query_as(
        r#"SELECT "from", "table", "to", "on_delete" FROM pragma_foreign_key_list(?)"#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    for expected in entity.foreign_keys() {
        let actual = foreign_keys.iter().find(|fk| {
            fk.from == expected.column
                && fk.table == expected.target
                && fk.to == expected.target_column
        });
        match actual {
            None => drift.push(SchemaDrift::MissingForeignKey {
                table,
                column: expected.column,
                target: expected.target,
            }),
            Some(fk) if !fk.on_delete.eq_ignore_ascii_case(expected.on_delete.as_sql()) => {
                drift.push(SchemaDrift::OnDeleteMismatch {
                    table,
                    column: expected.column,
                    expected: expected.on_delete,
                    actual: fk.on_delete.clone(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Length in a declared type such as `varchar(21)`.
fn declared_length(declared: &str) -> Option<usize> {
    let (_, rest) = declared.split_once('(')?;
    let (length, _) = rest.split_once(')')?;
    length.trim().parse().ok()
}

async fn index_columns(
    conn: &mut SqliteConnection,
    index: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as(r#"SELECT "name" FROM pragma_index_info(?) ORDER BY "seqno""#)
            .bind(index)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}
