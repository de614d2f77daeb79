//! Schema subsystem: document types, resolver, and the resolved model.
//!
//! - [`document`] - raw schema document wire types (serde)
//! - [`resolver`] - extends and type-reference resolution
//! - [`model`] - the immutable resolved schema graph

pub mod document;
pub mod model;
pub mod resolver;

pub use document::{SchemaDocument, TableDocument};
pub use model::{Column, ColumnRef, DataType, ResolvedSchema, Table};
pub use resolver::{resolve, SchemaError};
