//! Integration tests for linked-entity filters: joins, foreign-key fallback
//! and failures when a needed store is not deployed.

use insta::assert_snapshot;
use obsql::compile::{compile_filter, CompileContext, CompileError};
use obsql::config::TableNames;
use obsql::filter::{
    DataStreamFilter, EntityFilter, EntityKind, FoiFilter, FullTextFilter, ObsFilter,
    SpatialFilter, SystemFilter, TemporalFilter,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn assert_valid_sql(sql: &str) {
    if let Err(e) = Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        panic!("Invalid SQL: {}\n{}", e, sql);
    }
}

fn compile_obs(tables: &TableNames, filter: ObsFilter) -> Result<String, CompileError> {
    compile_filter(&EntityFilter::Observation(filter), CompileContext::new(tables)).map(|o| o.sql)
}

fn all_stores() -> TableNames {
    TableNames::default()
        .with_datastream("ds")
        .with_foi("foi")
        .with_system("sys")
}

// ============================================================================
// Joins
// ============================================================================

#[test]
fn test_two_hop_join_composition() {
    let filter = ObsFilter::new().with_data_streams(
        DataStreamFilter::new()
            .with_output_names(["temp"])
            .with_systems(SystemFilter::new().with_unique_ids(["urn:osh:station:1"])),
    );

    let sql = compile_obs(&all_stores(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs INNER JOIN ds ON obs.datastreamid = ds.id INNER JOIN sys ON (ds.data->'system@id'->'internalID'->>'id')::bigint = sys.id WHERE (sys.data->'properties'->>'uid') = 'urn:osh:station:1' AND (ds.data->>'outputName') IN ('temp')");
    assert_eq!(sql.matches("INNER JOIN").count(), 2);
    assert_eq!(sql.matches("WHERE").count(), 1);
    assert_valid_sql(&sql);
}

#[test]
fn test_data_stream_and_foi_joins_with_latest() {
    let filter = ObsFilter::new()
        .with_data_streams(DataStreamFilter::new().with_full_text(FullTextFilter::new(["wind"])))
        .with_fois(FoiFilter::new().with_unique_ids(["urn:site:42"]))
        .with_result_time(TemporalFilter::Latest);

    let sql = compile_obs(&all_stores(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT DISTINCT ON (obs.datastreamid) obs.* FROM obs INNER JOIN ds ON obs.datastreamid = ds.id INNER JOIN foi ON obs.foiid = foi.id WHERE (ds.data->'recordSchema'->>'description') ~* '(wind)' AND (foi.data->'properties'->>'uid') = 'urn:site:42' ORDER BY obs.datastreamid, obs.resultTime DESC");
    assert_valid_sql(&sql);
}

#[test]
fn test_bare_ids_never_join() {
    let filter = ObsFilter::new().with_data_stream_ids([3]).with_foi_ids([4]);

    let sql = compile_obs(&all_stores(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs WHERE obs.datastreamid = 3 AND obs.foiid = 4");
}

#[test]
fn test_schema_qualified_join() {
    let tables = TableNames::default()
        .with_obs("sensors.obs")
        .with_datastream("sensors.ds");
    let filter = ObsFilter::new().with_data_streams(DataStreamFilter::new().with_output_names(["rain"]));

    let sql = compile_obs(&tables, filter).unwrap();
    assert_snapshot!(sql, @"SELECT sensors.obs.* FROM sensors.obs INNER JOIN sensors.ds ON sensors.obs.datastreamid = sensors.ds.id WHERE (sensors.ds.data->>'outputName') IN ('rain')");
    assert_valid_sql(&sql);
}

#[test]
fn test_latest_data_stream_version_under_latest_observation() {
    let filter = ObsFilter::new()
        .with_data_streams(DataStreamFilter::new().with_valid_time(TemporalFilter::Latest))
        .with_result_time(TemporalFilter::Latest);

    let sql = compile_obs(&all_stores(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT DISTINCT ON (obs.datastreamid) obs.* FROM obs INNER JOIN ds ON obs.datastreamid = ds.id WHERE ds.id IN (SELECT DISTINCT ON ((ds.data->>'name'), (ds.data->'system@id'->'internalID'->>'id')::bigint) ds.id FROM ds ORDER BY (ds.data->>'name'), (ds.data->'system@id'->'internalID'->>'id')::bigint, (ds.data->'validTime'->>'end')::timestamptz DESC) ORDER BY obs.datastreamid, obs.resultTime DESC");
    assert_valid_sql(&sql);
}

#[test]
fn test_latest_foi_version_under_observations() {
    let filter = ObsFilter::new().with_fois(
        FoiFilter::new()
            .with_unique_ids(["urn:site:42"])
            .with_valid_time(TemporalFilter::Latest),
    );

    let sql = compile_obs(&all_stores(), filter).unwrap();
    assert!(sql.starts_with("SELECT obs.* FROM obs INNER JOIN foi"));
    assert!(sql.contains(
        "(foi.id, (foi.data->'properties'->'validTime'->>0)::timestamptz) IN (SELECT DISTINCT ON (foi.id) foi.id, (foi.data->'properties'->'validTime'->>0)::timestamptz FROM foi"
    ));
    assert!(!sql.contains(" ORDER BY obs."));
    assert_valid_sql(&sql);
}

// ============================================================================
// Flat fallback
// ============================================================================

#[test]
fn test_foi_id_without_store_is_flat() {
    let sql = compile_obs(&TableNames::default(), ObsFilter::new().with_foi_ids([42])).unwrap();

    assert_snapshot!(sql, @"SELECT obs.* FROM obs WHERE obs.foiid = 42");
    assert!(!sql.contains("JOIN"));
}

#[test]
fn test_nested_ids_without_store_are_flat() {
    let filter = ObsFilter::new()
        .with_fois(FoiFilter::new().with_internal_ids([1, 2]))
        .with_data_streams(DataStreamFilter::new().with_internal_ids([9]));

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs WHERE obs.datastreamid = 9 AND obs.foiid IN (1, 2)");
}

#[test]
fn test_system_ids_flat_inside_data_stream_join() {
    let tables = TableNames::default().with_datastream("ds");
    let filter = ObsFilter::new().with_data_streams(DataStreamFilter::new().with_system_ids([5]));

    let sql = compile_obs(&tables, filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs INNER JOIN ds ON obs.datastreamid = ds.id WHERE (ds.data->'system@id'->'internalID'->>'id')::bigint = 5");
    assert_valid_sql(&sql);
}

// ============================================================================
// Fail fast
// ============================================================================

#[test]
fn test_foi_criteria_without_store_fail() {
    let filter = ObsFilter::new().with_fois(
        FoiFilter::new().with_location(SpatialFilter::intersects("POLYGON((0 0, 1 0, 1 1, 0 0))")),
    );

    let result = compile_obs(&TableNames::default(), filter);
    assert_eq!(
        result,
        Err(CompileError::NoLinkedStore {
            entity: EntityKind::FeatureOfInterest,
            field: "foi"
        })
    );
}

#[test]
fn test_foi_unique_ids_without_store_fail() {
    let filter = ObsFilter::new().with_fois(FoiFilter::new().with_unique_ids(["urn:site:1"]));

    let result = compile_obs(&TableNames::default(), filter);
    assert!(matches!(result, Err(CompileError::NoLinkedStore { .. })));
}

#[test]
fn test_missing_system_store_two_hops_down() {
    let tables = TableNames::default().with_datastream("ds");
    let filter = ObsFilter::new().with_data_streams(
        DataStreamFilter::new()
            .with_systems(SystemFilter::new().with_full_text(FullTextFilter::new(["buoy"]))),
    );

    let result = compile_obs(&tables, filter);
    assert_eq!(
        result,
        Err(CompileError::NoLinkedStore {
            entity: EntityKind::System,
            field: "system"
        })
    );
}

#[test]
fn test_unsupported_nested_field_through_join() {
    let filter = ObsFilter::new().with_fois(FoiFilter {
        observations: Some(Box::new(ObsFilter::new())),
        ..FoiFilter::default()
    });

    let result = compile_obs(&all_stores(), filter);
    assert_eq!(
        result,
        Err(CompileError::Unsupported {
            entity: EntityKind::FeatureOfInterest,
            field: "observations"
        })
    );
}
