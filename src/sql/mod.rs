//! SQL generation module.
//!
//! This module provides a type-safe SQL builder targeting a single generic
//! dialect (ANSI double-quoted identifiers, uppercase keywords, `LIMIT`,
//! `@name` bind parameters). It includes:
//!
//! - [`query`] - SELECT statement builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation

pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use expr::{
    col, func, lit_bool, lit_int, lit_null, lit_str, param, table_col, BinaryOperator, Expr,
    ExprExt, Literal, UnaryOperator,
};
pub use query::{Cte, Join, JoinType, OrderByExpr, SelectExpr, SelectStatement, SortDir, TableRef};
pub use token::{Token, TokenStream};
