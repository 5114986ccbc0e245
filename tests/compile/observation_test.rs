//! Integration tests for observation queries: time ranges, latest values and
//! the statistics variant.

use chrono::{TimeZone, Utc};
use insta::assert_snapshot;
use obsql::compile::{compile_filter, CompileContext, CompileError, EntityQueryCompiler, ObsQueryCompiler};
use obsql::config::TableNames;
use obsql::filter::{EntityFilter, EntityKind, ObsFilter, ObsStatsFilter, TemporalFilter};
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

// ============================================================================
// Range containment
// ============================================================================

#[test]
fn test_phenomenon_time_range() {
    let filter = ObsFilter::new()
        .with_data_stream_ids([7])
        .with_phenomenon_time(TemporalFilter::range(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
        ));

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs WHERE obs.datastreamid = 7 AND tstzrange('2024-01-01T00:00:00Z','2024-01-31T23:59:59Z', '[]') @> obs.phenomenonTime");
    assert!(!sql.contains("DISTINCT"));
    assert!(!sql.contains("ORDER BY"));
    assert_valid_sql(&sql);
}

#[test]
fn test_range_bounds_truncated_to_seconds() {
    let min = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        + chrono::Duration::milliseconds(750);
    let max = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
    let filter = ObsFilter::new().with_result_time(TemporalFilter::range(min, max));

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert!(sql.contains("tstzrange('2024-01-01T00:00:00Z','2024-01-01T00:00:01Z', '[]')"));
}

#[test]
fn test_extreme_bounds_become_infinity() {
    let filter = ObsFilter::new().with_result_time(TemporalFilter::range(
        Utc.with_ymd_and_hms(-5000, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(3500, 1, 1, 0, 0, 0).unwrap(),
    ));

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT obs.* FROM obs WHERE tstzrange('-infinity','infinity', '[]') @> obs.resultTime");
}

#[test]
fn test_reversed_range_is_invalid() {
    let filter = ObsFilter::new().with_phenomenon_time(TemporalFilter::range(
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let result = compile_obs(&TableNames::default(), filter);
    assert!(matches!(result, Err(CompileError::InvalidFilter(_))));
}

// ============================================================================
// Latest value
// ============================================================================

#[test]
fn test_latest_result_time() {
    let filter = ObsFilter::new().with_result_time(TemporalFilter::Latest);

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT DISTINCT ON (obs.datastreamid) obs.* FROM obs ORDER BY obs.datastreamid, obs.resultTime DESC");
    assert!(!sql.contains("WHERE"));
    assert_valid_sql(&sql);
}

#[test]
fn test_latest_with_range_on_other_field() {
    let filter = ObsFilter::new()
        .with_phenomenon_time(TemporalFilter::range(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        ))
        .with_result_time(TemporalFilter::Latest);

    let sql = compile_obs(&TableNames::default(), filter).unwrap();
    assert_snapshot!(sql, @"SELECT DISTINCT ON (obs.datastreamid) obs.* FROM obs WHERE tstzrange('2024-01-01T00:00:00Z','2024-01-02T00:00:00Z', '[]') @> obs.phenomenonTime ORDER BY obs.datastreamid, obs.resultTime DESC");
    assert_valid_sql(&sql);
}

#[test]
fn test_end_to_end_latest_for_one_stream() {
    let json = r#"{ "dataStream": { "ids": [7] }, "resultTime": { "type": "latest" } }"#;
    let filter = EntityFilter::from_json(EntityKind::Observation, json).unwrap();
    let tables = TableNames::default();

    let output = compile_filter(&filter, CompileContext::new(&tables)).unwrap();
    assert_snapshot!(output.sql, @"SELECT DISTINCT ON (obs.datastreamid) obs.* FROM obs WHERE obs.datastreamid = 7 ORDER BY obs.datastreamid, obs.resultTime DESC");
    assert!(!output.sql.contains("JOIN"));
    assert_valid_sql(&output.sql);
    assert_valid_sql(&output.count_sql);
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_build_is_idempotent() {
    let tables = TableNames::default().with_datastream("ds");
    let compiler = ObsQueryCompiler::new(CompileContext::new(&tables)).unwrap();
    let filter = ObsFilter::new()
        .with_data_stream_ids([1, 2])
        .with_phenomenon_time(TemporalFilter::Latest);

    let query = compiler.query(&filter).unwrap();
    assert_eq!(query.build(), query.build());
}

#[test]
fn test_compiling_twice_into_one_builder_is_stable() {
    let tables = TableNames::default();
    let compiler = ObsQueryCompiler::new(CompileContext::new(&tables)).unwrap();
    let filter = ObsFilter::new()
        .with_foi_ids([3])
        .with_result_time(TemporalFilter::Latest);

    let mut query = compiler.query(&filter).unwrap();
    let once = query.build();
    compiler.compile(&filter, &mut query).unwrap();
    assert_eq!(query.build(), once);
}

#[test]
fn test_custom_obs_table() {
    let tables = TableNames::default().with_obs("sensors.obs");
    let sql = compile_obs(&tables, ObsFilter::new().with_data_stream_ids([7])).unwrap();

    assert_snapshot!(sql, @"SELECT sensors.obs.* FROM sensors.obs WHERE sensors.obs.datastreamid = 7");
    assert_valid_sql(&sql);
}

#[test]
fn test_no_obs_table() {
    let result = compile_obs(&TableNames::none(), ObsFilter::new());
    assert_eq!(result, Err(CompileError::MissingTable(EntityKind::Observation)));
}

#[test]
fn test_limit_and_count() {
    let filter = EntityFilter::Observation(ObsFilter::new().with_foi_ids([5]).with_limit(100));
    let tables = TableNames::default();

    let output = compile_filter(&filter, CompileContext::new(&tables)).unwrap();
    assert_snapshot!(output.sql, @"SELECT obs.* FROM obs WHERE obs.foiid = 5 LIMIT 100");
    assert_snapshot!(output.count_sql, @"SELECT COUNT(*) FROM obs WHERE obs.foiid = 5");
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_stats_pinned_ids() {
    let filter = ObsStatsFilter::new(ObsFilter::new().with_phenomenon_time(TemporalFilter::range(
        Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap(),
    )))
    .with_data_stream_id(11)
    .with_foi_id(0);
    let tables = TableNames::default();

    let output = compile_filter(
        &EntityFilter::ObservationStatistics(filter),
        CompileContext::new(&tables),
    )
    .unwrap();
    assert_snapshot!(output.sql, @"SELECT obs.* FROM obs WHERE obs.datastreamid = 11 AND obs.foiid IS NULL AND tstzrange('2023-06-01T00:00:00Z','2023-07-01T00:00:00Z', '[]') @> obs.phenomenonTime");
    assert_valid_sql(&output.sql);
}
