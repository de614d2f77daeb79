//! Query request wire types.
//!
//! These are plain serde structs: a request names columns as dotted
//! `"Table.Column"` strings and carries scalar literals as JSON values.
//! Validation against the schema happens in [`crate::query::spec`].

use serde::{Deserialize, Serialize};

/// A structured analytical query request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Select/grouping columns shared by every aggregation.
    #[serde(default)]
    pub select: Vec<String>,

    /// The aggregations to compute, one CTE each.
    pub aggregations: Vec<AggregationRequest>,

    /// Filters applied to every aggregation.
    #[serde(default)]
    pub filters: Vec<FilterRequest>,
}

/// One requested aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationRequest {
    /// The value column, as `"Table.Column"`.
    pub column: String,

    /// The aggregation function; absent means raw pass-through.
    #[serde(default)]
    pub function: AggregationFunction,

    /// Filters applied to this aggregation only.
    #[serde(default)]
    pub filters: Vec<FilterRequest>,
}

/// One requested filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// The filtered column, as `"Table.Column"`.
    pub column: String,

    /// Comparison operator, e.g. `"="` or `">="`.
    pub operator: String,

    /// Scalar literal to compare against.
    pub value: serde_json::Value,
}

/// Aggregation functions. `None` passes the value through unaggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationFunction {
    Sum,
    Count,
    Avg,
    Min,
    Max,
    #[default]
    None,
}

impl AggregationFunction {
    /// The SQL function name, or `None` for raw pass-through.
    pub fn sql_name(self) -> Option<&'static str> {
        match self {
            Self::Sum => Some("Sum"),
            Self::Count => Some("Count"),
            Self::Avg => Some("Avg"),
            Self::Min => Some("Min"),
            Self::Max => Some("Max"),
            Self::None => None,
        }
    }
}

/// Supported filter comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
}

impl FilterOperator {
    /// Parse an operator string from a request. `!=` is an alias for `<>`,
    /// and `LIKE` is case-insensitive.
    pub fn parse(operator: &str) -> Option<Self> {
        match operator {
            "=" => Some(Self::Eq),
            "<>" | "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Gte),
            "<=" => Some(Self::Lte),
            _ if operator.eq_ignore_ascii_case("like") => Some(Self::Like),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "LIKE",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
