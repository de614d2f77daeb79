//! End-to-end tests for the high-level compile API.

use once_cell::sync::Lazy;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use trellis::compile::{compile_query_json, CompileError, CompileOptions};
use trellis::schema::ResolvedSchema;

static SCHEMA: Lazy<ResolvedSchema> = Lazy::new(|| {
    ResolvedSchema::from_json(
        r#"{ "schema": "Testing",
             "tables": [
               { "table": "Vendor",
                 "id": { "Id": ["int"] },
                 "columns": { "VendorName": ["string"] } },
               { "table": "Invoice",
                 "id": { "Id": ["long"] },
                 "columns": { "VendorId": ["Vendor"],
                              "Amount": ["decimal"],
                              "Paid": ["bool?"] } } ] }"#,
    )
    .unwrap()
});

#[test]
fn compiles_request_with_default_limit() {
    let output = compile_query_json(
        &SCHEMA,
        r#"{ "select": ["Vendor.VendorName"],
             "aggregations": [ { "column": "Invoice.Amount", "function": "Sum" } ] }"#,
        CompileOptions::default(),
    )
    .unwrap();

    Parser::parse_sql(&GenericDialect {}, &output.sql).expect("compiled SQL must parse");
    assert!(output.sql.contains("LIMIT 100"));
    assert!(output.params.is_empty());
}

#[test]
fn limit_option_is_honored() {
    let output = compile_query_json(
        &SCHEMA,
        r#"{ "aggregations": [ { "column": "Vendor.VendorName" } ] }"#,
        CompileOptions::default().with_limit(25),
    )
    .unwrap();
    assert!(output.sql.contains("LIMIT 25"));
}

#[test]
fn parameters_carry_filter_literals_in_binding_order() {
    let output = compile_query_json(
        &SCHEMA,
        r#"{ "aggregations": [
               { "column": "Invoice.Amount", "function": "Sum" } ],
             "filters": [
               { "column": "Invoice.Paid", "operator": "=", "value": true },
               { "column": "Invoice.Amount", "operator": ">", "value": 100 } ] }"#,
        CompileOptions::default(),
    )
    .unwrap();

    let bound: Vec<(&str, serde_json::Value)> = output
        .params
        .iter()
        .map(|(name, value)| (name, value.clone()))
        .collect();
    assert_eq!(
        bound,
        vec![
            ("filter0", serde_json::json!(true)),
            ("filter1", serde_json::json!(100)),
        ]
    );
    assert!(output.sql.contains("@filter0"));
    assert!(output.sql.contains("@filter1"));
}

#[test]
fn query_errors_surface_as_compile_errors() {
    let result = compile_query_json(
        &SCHEMA,
        r#"{ "aggregations": [] }"#,
        CompileOptions::default(),
    );
    assert!(matches!(result, Err(CompileError::Query(_))));
}

#[test]
fn malformed_request_body_rejected() {
    let result = compile_query_json(&SCHEMA, "not a request", CompileOptions::default());
    assert!(matches!(result, Err(CompileError::Request(_))));
}
