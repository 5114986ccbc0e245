//! Integration tests for data stream, feature of interest and system queries
//! compiled from JSON filter documents.

use insta::assert_snapshot;
use obsql::compile::{compile_filter, CompileContext, CompileError};
use obsql::config::TableNames;
use obsql::filter::{EntityFilter, EntityKind};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn assert_valid_sql(sql: &str) {
    if let Err(e) = Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        panic!("Invalid SQL: {}\n{}", e, sql);
    }
}

fn tables() -> TableNames {
    TableNames::default()
        .with_datastream("ds")
        .with_foi("foi")
        .with_system("sys")
}

fn compile_json(entity: EntityKind, json: &str) -> Result<String, CompileError> {
    let filter = EntityFilter::from_json(entity, json).unwrap();
    let tables = tables();
    compile_filter(&filter, CompileContext::new(&tables)).map(|o| o.sql)
}

// ============================================================================
// Features of interest
// ============================================================================

#[test]
fn test_foi_latest_version_by_uid() {
    let sql = compile_json(
        EntityKind::FeatureOfInterest,
        r#"{ "uniqueIds": ["urn:lake:*"], "validTime": { "type": "latest" } }"#,
    )
    .unwrap();

    assert_snapshot!(sql, @"SELECT DISTINCT ON (foi.id) foi.* FROM foi WHERE (foi.data->'properties'->>'uid') ILIKE 'urn:lake:%' ORDER BY foi.id, (foi.data->'properties'->'validTime'->>0)::timestamptz DESC");
    assert_valid_sql(&sql);
}

#[test]
fn test_foi_parent_and_full_text() {
    let sql = compile_json(
        EntityKind::FeatureOfInterest,
        r#"{ "parent": { "ids": [8] }, "fullText": { "keywords": ["river", "delta"] } }"#,
    )
    .unwrap();

    assert_snapshot!(sql, @"SELECT foi.* FROM foi WHERE foi.parentid = 8 AND ((foi.data->'properties'->>'name') ~* '(river|delta)' OR (foi.data->'properties'->>'description') ~* '(river|delta)')");
    assert_valid_sql(&sql);
}

#[test]
fn test_foi_empty_keywords_invalid() {
    let result = compile_json(
        EntityKind::FeatureOfInterest,
        r#"{ "fullText": { "keywords": [] } }"#,
    );
    assert!(matches!(result, Err(CompileError::InvalidFilter(_))));
}

// ============================================================================
// Systems
// ============================================================================

#[test]
fn test_system_members_within_area() {
    let sql = compile_json(
        EntityKind::System,
        r#"{
            "internalIds": [2, 1],
            "includeMembers": true,
            "location": { "wkt": "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))", "op": "within" }
        }"#,
    )
    .unwrap();

    assert_snapshot!(sql, @"SELECT sys.* FROM sys WHERE (sys.id IN (1, 2) OR sys.parentid IN (1, 2)) AND ST_Within(sys.geometry, ST_GeomFromText('POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))', 4326))");
    assert_valid_sql(&sql);
}

#[test]
fn test_system_procedure_unsupported() {
    let result = compile_json(EntityKind::System, r#"{ "procedure": {} }"#);
    assert_eq!(
        result,
        Err(CompileError::Unsupported {
            entity: EntityKind::System,
            field: "procedure"
        })
    );
}

// ============================================================================
// Data streams
// ============================================================================

#[test]
fn test_data_stream_valid_time_contains() {
    let sql = compile_json(
        EntityKind::DataStream,
        r#"{
            "validTime": {
                "type": "range",
                "min": "2024-01-01T00:00:00Z",
                "max": "2024-12-31T00:00:00Z",
                "op": "contains"
            }
        }"#,
    )
    .unwrap();

    assert_snapshot!(sql, @"SELECT ds.* FROM ds WHERE tstzrange((ds.data->'validTime'->>'begin')::timestamptz,(ds.data->'validTime'->>'end')::timestamptz) @> '[2024-01-01T00:00:00Z,2024-12-31T00:00:00Z]'::tstzrange");
    assert_valid_sql(&sql);
}

#[test]
fn test_data_stream_latest_per_output() {
    let sql = compile_json(
        EntityKind::DataStream,
        r#"{ "system": { "ids": [4] }, "validTime": { "type": "latest" } }"#,
    )
    .unwrap();

    assert_snapshot!(sql, @"SELECT DISTINCT ON ((ds.data->>'name'), (ds.data->'system@id'->'internalID'->>'id')::bigint) ds.* FROM ds WHERE (ds.data->'system@id'->'internalID'->>'id')::bigint = 4 ORDER BY (ds.data->>'name'), (ds.data->'system@id'->'internalID'->>'id')::bigint, (ds.data->'validTime'->>'end')::timestamptz DESC");
    assert_valid_sql(&sql);
}

#[test]
fn test_data_stream_table_missing() {
    let filter = EntityFilter::from_json(EntityKind::DataStream, "{}").unwrap();
    let tables = TableNames::default();

    let result = compile_filter(&filter, CompileContext::new(&tables));
    assert!(matches!(
        result,
        Err(CompileError::MissingTable(EntityKind::DataStream))
    ));
}
