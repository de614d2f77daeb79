//! The resolved schema model - an immutable graph of tables and columns.
//!
//! A [`ResolvedSchema`] is built once by the resolver and thereafter shared
//! by reference across any number of concurrent query compilations. Cross
//! references between columns and tables ([`ColumnRef`]) are stored as stable
//! keys into the schema rather than owning copies, so the model cannot drift
//! apart from itself.

use std::collections::HashMap;

/// Primitive column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    DateTime,
}

impl DataType {
    /// Parse a primitive type tag, case-insensitively.
    ///
    /// `boolean` and `integer` are accepted as synonyms. Returns `None` when
    /// the tag is not a primitive type (it may then name a table).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(Self::Bool),
            "byte" => Some(Self::Byte),
            "short" => Some(Self::Short),
            "int" | "integer" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "decimal" => Some(Self::Decimal),
            "string" => Some(Self::String),
            "datetime" => Some(Self::DateTime),
            _ => None,
        }
    }
}

/// A non-owning reference to a column: stable keys into the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A fully resolved column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Database column name.
    pub name_in_db: String,
    /// Resolved primitive type.
    pub data_type: DataType,
    /// Whether the declared type carried the `?` nullability marker.
    pub nullable: bool,
    /// When set, this column is a foreign key to another table's id column.
    pub target: Option<ColumnRef>,
    /// When set, this column was inherited from a base table's column.
    pub extends: Option<ColumnRef>,
}

/// A fully resolved table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Schema-unique table key.
    pub name: String,
    /// Database table name.
    pub name_in_db: String,
    /// The single id column.
    pub id_column: Column,
    /// Non-id columns: own declarations first, inherited after.
    pub columns: Vec<Column>,
}

impl Table {
    /// Look up a column by name, checking the id column first.
    pub fn column(&self, name: &str) -> Option<&Column> {
        if self.id_column.name == name {
            return Some(&self.id_column);
        }
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the given column is this table's id column.
    pub fn is_id_column(&self, column: &Column) -> bool {
        self.id_column.name == column.name
    }

    /// Find a column of this table holding a foreign key to `target_table`.
    ///
    /// The id column is scanned first, then declared columns in order; an
    /// extends-derived table reaches its base through the inherited id.
    pub fn foreign_key_to(&self, target_table: &str) -> Option<&Column> {
        std::iter::once(&self.id_column)
            .chain(self.columns.iter())
            .find(|c| {
                c.target
                    .as_ref()
                    .is_some_and(|t| t.table == target_table)
            })
    }
}

/// The resolved, immutable schema graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    /// Logical schema name.
    pub name: String,
    /// Database schema name.
    pub name_in_db: String,
    /// Tables in declaration order.
    pub tables: Vec<Table>,
    /// Name index into `tables`.
    index: HashMap<String, usize>,
}

impl ResolvedSchema {
    pub(crate) fn new(name: String, name_in_db: String, tables: Vec<Table>) -> Self {
        let index = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self {
            name,
            name_in_db,
            tables,
            index,
        }
    }

    /// Look up a table by key.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    /// Dereference a non-owning column reference.
    pub fn column(&self, reference: &ColumnRef) -> Option<&Column> {
        self.table(&reference.table)?.column(&reference.column)
    }
}
