//! Descriptor types for entity schemas.
//!
//! Descriptors are plain `'static` data so they can live in `const` items
//! and be shared by storage adapters and schema verification.

use std::fmt;

/// Logical column type, independent of the SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 21-character identifier (`varchar(21)`).
    Id,
    /// Unbounded `varchar`.
    String,
    /// Timestamp with time zone.
    Timestamp,
    /// Structured value (`jsonb` on Postgres, `text` on `SQLite`).
    Json,
}

impl ColumnType {
    /// Fixed length of the column, when the type carries one.
    pub const fn length(self) -> Option<usize> {
        match self {
            Self::Id => Some(crate::domain::AP_ID_LENGTH),
            _ => None,
        }
    }
}

/// A single column of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary: bool,
    /// Column-level uniqueness (a unique constraint on this column alone).
    pub unique: bool,
}

impl ColumnSchema {
    /// A non-null, non-unique column.
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
            primary: false,
            unique: false,
        }
    }

    /// A nullable, non-unique column.
    pub const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
            primary: false,
            unique: false,
        }
    }

    /// The `id` primary key shared by every entity.
    pub const fn primary_id() -> Self {
        Self {
            name: "id",
            column_type: ColumnType::Id,
            nullable: false,
            primary: true,
            unique: false,
        }
    }

    /// Mark the column unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A named index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

/// Cardinality of a relation, seen from the declaring entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
    OneToOne,
}

/// Referential action when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
}

impl OnDelete {
    /// The SQL spelling of the action.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
        }
    }
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A relation to another entity.
///
/// Relations with a `join_column` own a foreign key on the declaring table.
/// Inverse relations (`inverse_side` set, no join column) are navigational
/// only and produce no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSchema {
    pub name: &'static str,
    pub kind: RelationKind,
    pub target: &'static str,
    pub join_column: Option<&'static str>,
    pub inverse_side: Option<&'static str>,
    pub on_delete: OnDelete,
}

/// Foreign key derived from an owning relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub target: &'static str,
    pub target_column: &'static str,
    pub on_delete: OnDelete,
}

/// Full description of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: &'static str,
    pub columns: &'static [ColumnSchema],
    pub indices: &'static [IndexSchema],
    pub relations: &'static [RelationSchema],
}

impl EntitySchema {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up an index by name.
    pub fn index(&self, name: &str) -> Option<&IndexSchema> {
        self.indices.iter().find(|i| i.name == name)
    }

    /// Foreign keys owned by this table. Every key references `id`.
    pub fn foreign_keys(&self) -> impl Iterator<Item = ForeignKey> + '_ {
        self.relations.iter().filter_map(|r| {
            r.join_column.map(|column| ForeignKey {
                column,
                target: r.target,
                target_column: "id",
                on_delete: r.on_delete,
            })
        })
    }
}
