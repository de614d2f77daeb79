//! Schema resolution - compiles a raw document into the resolved model.
//!
//! Resolution runs two depth-first passes over the document:
//!
//! 1. **extends composition** - each table takes its own declared columns,
//!    then appends its base's columns (cloned, with back-references), and
//!    inherits the base's id column and database name when locally absent.
//! 2. **column type resolution** - each column's type tag is walked down to
//!    a primitive type; a tag naming another table makes the column a
//!    foreign key to that table's id column.
//!
//! Both passes are guarded by an explicit visiting stack keyed by table (or
//! `table.column`), so a cycle surfaces as a [`SchemaError`] carrying the
//! full chain rather than as unbounded recursion.

use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use super::document::{SchemaDocument, TableDocument, TypeArray};
use super::model::{Column, ColumnRef, DataType, ResolvedSchema, Table};

/// Errors raised while resolving a schema document.
///
/// These are definition-time errors: any one of them aborts resolution with
/// no partial schema, and is expected to be fatal at service startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema must have a non-empty schema property")]
    EmptySchemaName,

    #[error("schema must have a non-empty tables property")]
    NoTables,

    #[error("table must have a non-empty table property")]
    EmptyTableName,

    #[error("more than one table is named '{table}'")]
    DuplicateTable { table: String },

    #[error("table {table} id must have a single column")]
    IdArity { table: String },

    #[error("table {table} column {column} type must be an array of length 1 or 2")]
    TypeArity { table: String, column: String },

    #[error("no such table {extends}, referenced in {table}")]
    UnknownExtends { table: String, extends: String },

    #[error("circular reference detected: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("table {table} must have an id property (or use 'extends')")]
    MissingIdColumn { table: String },

    #[error("table {table} must have columns (or use 'extends')")]
    NoColumns { table: String },

    #[error("table {table} has more than one column named {column}")]
    DuplicateColumn { table: String, column: String },

    #[error("{tag} is neither a data type nor a table, in {column}")]
    UnknownType { tag: String, column: String },

    #[error("schema document error: {0}")]
    Document(#[from] serde_json::Error),
}

impl ResolvedSchema {
    /// Parse and resolve a schema document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_json::from_str(text)?;
        resolve(&doc)
    }
}

/// Resolve a schema document into the immutable schema model.
pub fn resolve(doc: &SchemaDocument) -> Result<ResolvedSchema, SchemaError> {
    let mut resolver = Resolver::new(doc)?;
    resolver.resolve_all()?;
    let schema = resolver.finish(doc);
    debug!(
        schema = %schema.name,
        tables = schema.tables.len(),
        "resolved schema document"
    );
    Ok(schema)
}

/// An in-flight column: declared shape plus resolution state.
#[derive(Debug, Clone)]
struct ColumnBuild {
    name: String,
    type_array: TypeArray,
    extends: Option<ColumnRef>,
    data_type: Option<DataType>,
    name_in_db: Option<String>,
    nullable: bool,
    target: Option<ColumnRef>,
}

impl ColumnBuild {
    fn declared(name: &str, type_array: &TypeArray) -> Self {
        Self {
            name: name.into(),
            type_array: type_array.clone(),
            extends: None,
            data_type: None,
            name_in_db: None,
            nullable: false,
            target: None,
        }
    }

    fn inherited(parent_table: &str, parent: &ColumnBuild) -> Self {
        Self {
            extends: Some(ColumnRef::new(parent_table, &parent.name)),
            ..Self::declared(&parent.name, &parent.type_array)
        }
    }

    fn finish(self) -> Column {
        Column {
            name: self.name,
            // both set by the respective resolution pass
            name_in_db: self.name_in_db.unwrap(),
            data_type: self.data_type.unwrap(),
            nullable: self.nullable,
            target: self.target,
            extends: self.extends,
        }
    }
}

/// An in-flight table.
#[derive(Debug)]
struct TableBuild {
    name: String,
    name_in_db: Option<String>,
    id: Option<ColumnBuild>,
    columns: Vec<ColumnBuild>,
    composed: bool,
}

/// Which column of a table a type-resolution step addresses.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Id,
    Col(usize),
}

struct Resolver<'d> {
    raw: IndexMap<String, &'d TableDocument>,
    tables: IndexMap<String, TableBuild>,
    stack: Vec<String>,
}

impl<'d> Resolver<'d> {
    /// Up-front structural validation, before any graph walking.
    fn new(doc: &'d SchemaDocument) -> Result<Self, SchemaError> {
        if doc.schema.trim().is_empty() {
            return Err(SchemaError::EmptySchemaName);
        }
        if doc.tables.is_empty() {
            return Err(SchemaError::NoTables);
        }

        let mut raw = IndexMap::new();
        for table in &doc.tables {
            if table.table.trim().is_empty() {
                return Err(SchemaError::EmptyTableName);
            }
            if raw.insert(table.table.clone(), table).is_some() {
                return Err(SchemaError::DuplicateTable {
                    table: table.table.clone(),
                });
            }

            if let Some(id) = &table.id {
                if id.len() != 1 {
                    return Err(SchemaError::IdArity {
                        table: table.table.clone(),
                    });
                }
            }
            let declared = table.id.iter().chain(table.columns.iter()).flatten();
            for (name, type_array) in declared {
                if type_array.is_empty() || type_array.len() > 2 {
                    return Err(SchemaError::TypeArity {
                        table: table.table.clone(),
                        column: name.clone(),
                    });
                }
            }
        }

        let tables = raw
            .keys()
            .map(|key| {
                (
                    key.clone(),
                    TableBuild {
                        name: key.clone(),
                        name_in_db: None,
                        id: None,
                        columns: Vec::new(),
                        composed: false,
                    },
                )
            })
            .collect();

        Ok(Self {
            raw,
            tables,
            stack: Vec::new(),
        })
    }

    fn resolve_all(&mut self) -> Result<(), SchemaError> {
        let keys: Vec<String> = self.raw.keys().cloned().collect();

        for key in &keys {
            self.compose_extends(key)?;
        }

        for key in &keys {
            self.resolve_column_type(key, Slot::Id)?;
            let count = self.tables[key.as_str()].columns.len();
            for i in 0..count {
                self.resolve_column_type(key, Slot::Col(i))?;
            }
        }

        Ok(())
    }

    /// First pass: depth-first extends composition for one table.
    fn compose_extends(&mut self, key: &str) -> Result<(), SchemaError> {
        if self.stack.iter().any(|k| k == key) {
            let mut chain = self.stack.clone();
            chain.push(key.into());
            return Err(SchemaError::CircularReference { chain });
        }
        if self.tables[key].composed {
            return Ok(());
        }
        self.stack.push(key.into());

        let raw = *self.raw.get(key).unwrap();

        let mut id = raw.id.as_ref().and_then(|m| {
            m.first()
                .map(|(name, type_array)| ColumnBuild::declared(name, type_array))
        });
        let mut columns: Vec<ColumnBuild> = raw
            .columns
            .iter()
            .flatten()
            .map(|(name, type_array)| ColumnBuild::declared(name, type_array))
            .collect();
        let mut name_in_db = raw.name.clone();

        if let Some(parent_key) = &raw.extends {
            if !self.raw.contains_key(parent_key.as_str()) {
                return Err(SchemaError::UnknownExtends {
                    table: key.into(),
                    extends: parent_key.clone(),
                });
            }
            self.compose_extends(parent_key)?;

            let parent = &self.tables[parent_key.as_str()];
            columns.extend(
                parent
                    .columns
                    .iter()
                    .map(|c| ColumnBuild::inherited(parent_key, c)),
            );
            if id.is_none() {
                // parent is fully composed, so its id is present
                let parent_id = parent.id.as_ref().unwrap();
                id = Some(ColumnBuild::inherited(parent_key, parent_id));
            }
            if name_in_db.is_none() {
                name_in_db = parent.name_in_db.clone();
            }
        }

        let id = id.ok_or_else(|| SchemaError::MissingIdColumn { table: key.into() })?;
        if columns.is_empty() {
            return Err(SchemaError::NoColumns { table: key.into() });
        }

        let mut seen = HashSet::new();
        for column in std::iter::once(&id).chain(columns.iter()) {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: key.into(),
                    column: column.name.clone(),
                });
            }
        }

        let build = self.tables.get_mut(key).unwrap();
        build.id = Some(id);
        build.columns = columns;
        build.name_in_db = Some(name_in_db.unwrap_or_else(|| key.into()));
        build.composed = true;

        self.stack.pop();
        Ok(())
    }

    /// Second pass: depth-first type resolution for one column.
    fn resolve_column_type(&mut self, table_key: &str, slot: Slot) -> Result<(), SchemaError> {
        let (col_name, type_array, resolved) = {
            let table = &self.tables[table_key];
            let column = match slot {
                Slot::Id => table.id.as_ref().unwrap(),
                Slot::Col(i) => &table.columns[i],
            };
            (
                column.name.clone(),
                column.type_array.clone(),
                column.data_type.is_some(),
            )
        };

        let stack_key = format!("{table_key}.{col_name}");
        if self.stack.iter().any(|k| *k == stack_key) {
            let mut chain = self.stack.clone();
            chain.push(stack_key);
            return Err(SchemaError::CircularReference { chain });
        }
        if resolved {
            // already-resolved columns are skipped, resolution is idempotent
            return Ok(());
        }
        self.stack.push(stack_key);

        let tag = &type_array[0];
        let (base, nullable) = match tag.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (tag.as_str(), false),
        };

        let (data_type, target) = if let Some(data_type) = DataType::parse(base) {
            (data_type, None)
        } else if self.tables.contains_key(base) {
            let target_key = base.to_string();
            self.resolve_column_type(&target_key, Slot::Id)?;
            let target_id = self.tables[target_key.as_str()].id.as_ref().unwrap();
            (
                target_id.data_type.unwrap(),
                Some(ColumnRef::new(&target_key, &target_id.name)),
            )
        } else {
            return Err(SchemaError::UnknownType {
                tag: base.into(),
                column: format!("{table_key}.{col_name}"),
            });
        };

        let table = self.tables.get_mut(table_key).unwrap();
        let column = match slot {
            Slot::Id => table.id.as_mut().unwrap(),
            Slot::Col(i) => &mut table.columns[i],
        };
        column.data_type = Some(data_type);
        column.target = target;
        column.nullable = nullable;
        column.name_in_db = Some(type_array.get(1).cloned().unwrap_or(col_name));

        self.stack.pop();
        Ok(())
    }

    fn finish(self, doc: &SchemaDocument) -> ResolvedSchema {
        let tables = self
            .tables
            .into_values()
            .map(|build| Table {
                name: build.name,
                name_in_db: build.name_in_db.unwrap(),
                id_column: build.id.unwrap().finish(),
                columns: build.columns.into_iter().map(ColumnBuild::finish).collect(),
            })
            .collect();

        ResolvedSchema::new(
            doc.schema.clone(),
            doc.name.clone().unwrap_or_else(|| doc.schema.clone()),
            tables,
        )
    }
}
