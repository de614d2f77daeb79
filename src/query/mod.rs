//! Query subsystem: request wire types, validation, and SQL compilation.
//!
//! - [`request`] - serde wire types for query requests
//! - [`spec`] - validated specs bound into the schema graph
//! - [`filters`] - filter parameter binding
//! - [`compiler`] - join routing and CTE composition

pub mod compiler;
pub mod filters;
pub mod request;
pub mod spec;

pub use filters::FilterParameters;
pub use request::{
    AggregationFunction, AggregationRequest, FilterOperator, FilterRequest, QueryRequest,
};
pub use spec::{
    resolve_column_reference, AggregationSpec, BoundColumn, FilterSpec, QueryError, QuerySpec,
};
