//! Validated query specs - a request bound into the schema graph.
//!
//! A [`QuerySpec`] is built per request: every dotted column reference is
//! resolved to a concrete `(table, column)` pair, operators are parsed, and
//! structural problems are rejected eagerly. The spec borrows into the
//! shared [`ResolvedSchema`] and is discarded once SQL has been emitted.

use thiserror::Error;

use crate::schema::{Column, ResolvedSchema, Table};

use super::request::{
    AggregationFunction, AggregationRequest, FilterOperator, FilterRequest, QueryRequest,
};

/// Errors raised while validating a query request against the schema.
///
/// These are request-time errors, expected to become client-facing
/// rejections rather than to abort the service.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("column reference '{reference}' must be of the form Table.Column")]
    MalformedColumnReference { reference: String },

    #[error("no such table in {reference}")]
    UnknownTable { reference: String },

    #[error("no such column in {reference}")]
    UnknownColumn { reference: String },

    #[error("query must have at least one aggregation")]
    NoAggregations,

    #[error("aggregation {index} must name a value column")]
    MissingValueColumn { index: usize },

    #[error("unsupported filter operator '{operator}' on {column}")]
    UnsupportedOperator { operator: String, column: String },

    #[error("filter value for {column} must be a scalar literal")]
    NonScalarFilterValue { column: String },

    #[error("no foreign key path from {from} to {to}")]
    NoJoinPath { from: String, to: String },
}

/// A concrete `(table, column)` pair resolved from a dotted reference.
#[derive(Debug, Clone, Copy)]
pub struct BoundColumn<'s> {
    pub table: &'s Table,
    pub column: &'s Column,
}

/// Resolve a `"Table.Column"` string onto the schema.
pub fn resolve_column_reference<'s>(
    schema: &'s ResolvedSchema,
    reference: &str,
) -> Result<BoundColumn<'s>, QueryError> {
    let mut parts = reference.split('.');
    let (table_name, column_name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), Some(column), None) if !table.is_empty() && !column.is_empty() => {
            (table, column)
        }
        _ => {
            return Err(QueryError::MalformedColumnReference {
                reference: reference.into(),
            })
        }
    };

    let table = schema
        .table(table_name)
        .ok_or_else(|| QueryError::UnknownTable {
            reference: reference.into(),
        })?;
    let column = table
        .column(column_name)
        .ok_or_else(|| QueryError::UnknownColumn {
            reference: reference.into(),
        })?;

    Ok(BoundColumn { table, column })
}

/// A validated filter predicate.
#[derive(Debug, Clone)]
pub struct FilterSpec<'s> {
    pub column: BoundColumn<'s>,
    pub operator: FilterOperator,
    pub value: serde_json::Value,
}

impl<'s> FilterSpec<'s> {
    pub fn new(request: &FilterRequest, schema: &'s ResolvedSchema) -> Result<Self, QueryError> {
        let column = resolve_column_reference(schema, &request.column)?;
        let operator = FilterOperator::parse(&request.operator).ok_or_else(|| {
            QueryError::UnsupportedOperator {
                operator: request.operator.clone(),
                column: request.column.clone(),
            }
        })?;
        if request.value.is_array() || request.value.is_object() {
            return Err(QueryError::NonScalarFilterValue {
                column: request.column.clone(),
            });
        }
        Ok(Self {
            column,
            operator,
            value: request.value.clone(),
        })
    }
}

/// A validated aggregation: one value column, function, and filter set.
#[derive(Debug, Clone)]
pub struct AggregationSpec<'s> {
    pub column: BoundColumn<'s>,
    pub function: AggregationFunction,
    pub filters: Vec<FilterSpec<'s>>,
}

impl<'s> AggregationSpec<'s> {
    fn new(
        index: usize,
        request: &AggregationRequest,
        schema: &'s ResolvedSchema,
    ) -> Result<Self, QueryError> {
        if request.column.is_empty() {
            return Err(QueryError::MissingValueColumn { index });
        }
        let column = resolve_column_reference(schema, &request.column)?;
        let filters = request
            .filters
            .iter()
            .map(|f| FilterSpec::new(f, schema))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            column,
            function: request.function,
            filters,
        })
    }
}

/// A fully validated query, ready for SQL compilation.
#[derive(Debug, Clone)]
pub struct QuerySpec<'s> {
    pub schema: &'s ResolvedSchema,
    /// Ordered select/grouping columns shared by every aggregation.
    pub select: Vec<BoundColumn<'s>>,
    pub aggregations: Vec<AggregationSpec<'s>>,
    /// Filters applied to every aggregation.
    pub filters: Vec<FilterSpec<'s>>,
}

impl<'s> QuerySpec<'s> {
    /// Validate a request against the schema.
    pub fn new(request: &QueryRequest, schema: &'s ResolvedSchema) -> Result<Self, QueryError> {
        if request.aggregations.is_empty() {
            return Err(QueryError::NoAggregations);
        }

        let select = request
            .select
            .iter()
            .map(|reference| resolve_column_reference(schema, reference))
            .collect::<Result<_, _>>()?;
        let aggregations = request
            .aggregations
            .iter()
            .enumerate()
            .map(|(i, a)| AggregationSpec::new(i, a, schema))
            .collect::<Result<_, _>>()?;
        let filters = request
            .filters
            .iter()
            .map(|f| FilterSpec::new(f, schema))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            schema,
            select,
            aggregations,
            filters,
        })
    }
}
