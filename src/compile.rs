//! End-to-end compilation from a query request to parameterized SQL.
//!
//! This module provides the high-level API over the query subsystem:
//!
//! ```text
//! QueryRequest → Validate against ResolvedSchema → Route joins → SQL + params
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trellis::compile::{compile_query, CompileOptions};
//! use trellis::schema::ResolvedSchema;
//!
//! let schema = ResolvedSchema::from_json(schema_json)?;
//! let request = serde_json::from_str(request_json)?;
//! let output = compile_query(&schema, &request, CompileOptions::default())?;
//! println!("{}", output.sql);
//! for (name, value) in output.params.iter() {
//!     println!("  @{name} = {value}");
//! }
//! ```

use tracing::debug;

use crate::query::{FilterParameters, QueryError, QueryRequest, QuerySpec};
use crate::schema::ResolvedSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("request error: {0}")]
    Request(#[from] serde_json::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Maximum number of result rows.
    pub limit: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

impl CompileOptions {
    /// Set the result row limit.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a query request to SQL.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated SQL string.
    pub sql: String,

    /// Named bind parameters for the executing driver, in binding order.
    pub params: FilterParameters,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a query request against a resolved schema.
pub fn compile_query(
    schema: &ResolvedSchema,
    request: &QueryRequest,
    options: CompileOptions,
) -> CompileResult<CompileOutput> {
    let spec = QuerySpec::new(request, schema)?;
    let mut params = FilterParameters::new();
    let sql = spec.to_sql(&mut params, &[], options.limit)?;
    debug!(limit = options.limit, "compiled request");
    Ok(CompileOutput { sql, params })
}

/// Compile a query request supplied as JSON text.
///
/// This is a convenience for boundary layers that receive raw request
/// bodies; the request is deserialized first, then compiled.
pub fn compile_query_json(
    schema: &ResolvedSchema,
    request_json: &str,
    options: CompileOptions,
) -> CompileResult<CompileOutput> {
    let request: QueryRequest = serde_json::from_str(request_json)?;
    compile_query(schema, &request, options)
}

// ============================================================================
// Tests
// ============================================================================
