//! # Trellis
//!
//! Compiles declarative relational schemas and analytical query requests
//! into parameterized multi-CTE SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Schema Document (tables, columns, extends)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema resolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ResolvedSchema (immutable, fully typed)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!    Query Request ────────┤
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │          QuerySpec (bound into the schema graph)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [join router + compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SQL (WITH ... SELECT) + bind parameters           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The schema is resolved once at startup and shared by reference; each
//! query compilation is a pure, synchronous computation with its own
//! alias and parameter counters.

pub mod compile;
pub mod query;
pub mod schema;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_query, compile_query_json, CompileOptions, CompileOutput};
    pub use crate::query::{
        AggregationFunction, FilterOperator, FilterParameters, QueryError, QueryRequest, QuerySpec,
    };
    pub use crate::schema::{ColumnRef, DataType, ResolvedSchema, SchemaDocument, SchemaError};
}

// Also export the main entry points at crate root for convenience
pub use compile::{compile_query, compile_query_json, CompileError, CompileOptions, CompileOutput};
pub use query::{FilterParameters, QueryError, QueryRequest, QuerySpec};
pub use schema::{resolve, ResolvedSchema, SchemaDocument, SchemaError};
