//! Schema resolution tests: extends composition, type references, and the
//! full definition-time error taxonomy.

use trellis::schema::{ColumnRef, DataType, ResolvedSchema, SchemaError};

fn resolve(json: &str) -> Result<ResolvedSchema, SchemaError> {
    ResolvedSchema::from_json(json)
}

#[test]
fn resolves_basic_schema() {
    let schema = resolve(
        r#"{ "schema": "Testing",
             "tables": [
               { "table": "Vendor",
                 "id": { "Id": ["int"] },
                 "columns": { "VendorName": ["string"] } } ] }"#,
    )
    .unwrap();

    assert_eq!(schema.name, "Testing");
    assert_eq!(schema.name_in_db, "Testing");
    let vendor = schema.table("Vendor").unwrap();
    assert_eq!(vendor.name_in_db, "Vendor");
    assert_eq!(vendor.id_column.name, "Id");
    assert_eq!(vendor.id_column.data_type, DataType::Int);
    assert_eq!(vendor.columns.len(), 1);
    assert_eq!(vendor.columns[0].name_in_db, "VendorName");
}

#[test]
fn name_property_overrides_database_names() {
    let schema = resolve(
        r#"{ "schema": "Testing", "name": "dbo",
             "tables": [
               { "table": "Invoice", "name": "tblInvoice",
                 "id": { "Id": ["long"] },
                 "columns": { "Amount": ["decimal", "InvoiceAmount"] } } ] }"#,
    )
    .unwrap();

    assert_eq!(schema.name, "Testing");
    assert_eq!(schema.name_in_db, "dbo");
    let invoice = schema.table("Invoice").unwrap();
    assert_eq!(invoice.name, "Invoice");
    assert_eq!(invoice.name_in_db, "tblInvoice");
    assert_eq!(invoice.column("Amount").unwrap().name_in_db, "InvoiceAmount");
}

#[test]
fn extends_appends_inherited_columns_after_own() {
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Base",
                 "id": { "Id": ["int"] },
                 "columns": { "Name": ["string"] } },
               { "table": "Derived", "extends": "Base",
                 "columns": { "Extra": ["decimal"] } } ] }"#,
    )
    .unwrap();

    let derived = schema.table("Derived").unwrap();
    let names: Vec<&str> = derived.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Extra", "Name"]);

    assert_eq!(derived.columns[0].extends, None);
    assert_eq!(
        derived.columns[1].extends,
        Some(ColumnRef::new("Base", "Name"))
    );
    assert_eq!(derived.id_column.name, "Id");
    assert_eq!(derived.id_column.extends, Some(ColumnRef::new("Base", "Id")));
}

#[test]
fn extends_inherits_database_table_name() {
    // a derived table reads from its base's physical table unless renamed
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Base", "name": "tblBase",
                 "id": { "Id": ["int"] },
                 "columns": { "Name": ["string"] } },
               { "table": "Derived", "extends": "Base",
                 "columns": { "Extra": ["decimal"] } },
               { "table": "Renamed", "extends": "Base", "name": "tblOther",
                 "columns": { "Extra": ["decimal"] } } ] }"#,
    )
    .unwrap();

    assert_eq!(schema.table("Derived").unwrap().name_in_db, "tblBase");
    assert_eq!(schema.table("Renamed").unwrap().name_in_db, "tblOther");
}

#[test]
fn extends_composes_transitively() {
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "C", "extends": "B",
                 "columns": { "Third": ["bool"] } },
               { "table": "A",
                 "id": { "Id": ["int"] },
                 "columns": { "First": ["string"] } },
               { "table": "B", "extends": "A",
                 "columns": { "Second": ["decimal"] } } ] }"#,
    )
    .unwrap();

    let c = schema.table("C").unwrap();
    let names: Vec<&str> = c.columns.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
    assert_eq!(c.id_column.extends, Some(ColumnRef::new("B", "Id")));
    assert_eq!(
        c.columns[2].extends,
        Some(ColumnRef::new("B", "First"))
    );
}

#[test]
fn own_id_overrides_inherited_id() {
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Base",
                 "id": { "Id": ["int"] },
                 "columns": { "Name": ["string"] } },
               { "table": "Derived", "extends": "Base",
                 "id": { "Key": ["long"] },
                 "columns": { "Extra": ["decimal"] } } ] }"#,
    )
    .unwrap();

    let derived = schema.table("Derived").unwrap();
    assert_eq!(derived.id_column.name, "Key");
    assert_eq!(derived.id_column.data_type, DataType::Long);
    assert_eq!(derived.id_column.extends, None);
}

#[test]
fn extends_cycle_reports_full_chain() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "A", "extends": "B",
                 "columns": { "X": ["int"] } },
               { "table": "B", "extends": "A",
                 "columns": { "Y": ["int"] } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, SchemaError::CircularReference { .. }));
    let message = err.to_string();
    assert!(message.contains("A"));
    assert!(message.contains("B"));
    assert!(message.contains("->"));
}

#[test]
fn type_reference_cycle_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "T",
                 "id": { "Id": ["T"] },
                 "columns": { "Name": ["string"] } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, SchemaError::CircularReference { .. }));
    assert!(err.to_string().contains("T.Id"));
}

#[test]
fn unknown_extends_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Derived", "extends": "Phantom",
                 "columns": { "Extra": ["decimal"] } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, SchemaError::UnknownExtends { .. }));
    assert!(err.to_string().contains("Phantom"));
}

#[test]
fn duplicate_table_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "T", "id": { "Id": ["int"] }, "columns": { "A": ["int"] } },
               { "table": "T", "id": { "Id": ["int"] }, "columns": { "B": ["int"] } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, SchemaError::DuplicateTable { .. }));
}

#[test]
fn inherited_column_clashing_with_own_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Base",
                 "id": { "Id": ["int"] },
                 "columns": { "Name": ["string"] } },
               { "table": "Derived", "extends": "Base",
                 "columns": { "Name": ["string"] } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SchemaError::DuplicateColumn { ref column, .. } if column == "Name"
    ));
}

#[test]
fn missing_id_without_extends_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [ { "table": "T", "columns": { "A": ["int"] } } ] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::MissingIdColumn { .. }));
}

#[test]
fn table_without_columns_rejected() {
    let err = resolve(
        r#"{ "schema": "S",
             "tables": [ { "table": "T", "id": { "Id": ["int"] } } ] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::NoColumns { .. }));
}

#[test]
fn foreign_key_adopts_target_id_type() {
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Invoice",
                 "id": { "Id": ["long"] },
                 "columns": { "VendorId": ["Vendor"], "Amount": ["decimal"] } },
               { "table": "Vendor",
                 "id": { "Id": ["short"] },
                 "columns": { "VendorName": ["string"] } } ] }"#,
    )
    .unwrap();

    let fk = schema.table("Invoice").unwrap().column("VendorId").unwrap();
    assert_eq!(fk.target, Some(ColumnRef::new("Vendor", "Id")));
    assert_eq!(fk.data_type, DataType::Short);
    assert_eq!(fk.name_in_db, "VendorId");
}

#[test]
fn nullable_foreign_key() {
    let schema = resolve(
        r#"{ "schema": "S",
             "tables": [
               { "table": "Vendor",
                 "id": { "Id": ["int"] },
                 "columns": { "VendorName": ["string"] } },
               { "table": "Invoice",
                 "id": { "Id": ["long"] },
                 "columns": { "VendorId": ["Vendor?"], "Amount": ["decimal"] } } ] }"#,
    )
    .unwrap();

    let fk = schema.table("Invoice").unwrap().column("VendorId").unwrap();
    assert!(fk.nullable);
    assert_eq!(fk.target, Some(ColumnRef::new("Vendor", "Id")));
}

#[test]
fn resolution_is_deterministic() {
    let json = r#"{ "schema": "S",
                    "tables": [
                      { "table": "Base",
                        "id": { "Id": ["int"] },
                        "columns": { "Name": ["string"] } },
                      { "table": "Derived", "extends": "Base",
                        "columns": { "Extra": ["Base"] } } ] }"#;

    let first = resolve(json).unwrap();
    let second = resolve(json).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_json_rejected() {
    let err = resolve("{ not json").unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));
}
