//! Raw schema document wire types.
//!
//! A schema document is the declarative input to the resolver: a schema name
//! plus a list of table definitions. Column maps are order-preserving so the
//! resolved column order matches the declaration order in the document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A column type declaration: `[type]` or `[type, dbName]`.
///
/// The type tag is either a primitive type name (optionally suffixed `?` for
/// nullable) or the name of another table, which makes the column a foreign
/// key to that table's id column.
pub type TypeArray = Vec<String>;

/// The whole schema definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Logical schema name. Required, non-empty.
    pub schema: String,

    /// Database schema name; defaults to `schema` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Table definitions in declaration order.
    pub tables: Vec<TableDocument>,
}

/// One table definition within a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    /// Schema-unique table key.
    pub table: String,

    /// Database table name; defaults to `table` (or inherits via `extends`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The id column declaration. Exactly one entry when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IndexMap<String, TypeArray>>,

    /// Non-id column declarations in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<IndexMap<String, TypeArray>>,

    /// Key of the table this one inherits from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}
