//! Integration tests for loading table configuration from TOML files.

use std::fs;
use std::path::PathBuf;

use obsql::compile::{compile_filter, CompileContext};
use obsql::config::{Settings, SettingsError, CONFIG_ENV_VAR};
use obsql::filter::{EntityFilter, EntityKind, ObsFilter};

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("obsql-{}-{}.toml", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file() {
    let path = write_config(
        "from-file",
        r#"
[tables]
obs = "obs"
datastream = "datastreams"
"#,
    );

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(
        settings.tables.table_for(EntityKind::DataStream),
        Some("datastreams")
    );
    assert_eq!(settings.tables.table_for(EntityKind::FeatureOfInterest), None);
}

#[test]
fn test_missing_obs_defaults() {
    let path = write_config("defaults", "[tables]\nfoi = \"features\"\n");

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(settings.tables.table_for(EntityKind::Observation), Some("obs"));
    assert_eq!(
        settings.tables.table_for(EntityKind::FeatureOfInterest),
        Some("features")
    );
}

#[test]
fn test_malformed_file() {
    let path = write_config("malformed", "[tables\nobs = ");

    let result = Settings::from_file(&path);
    fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(SettingsError::ParseError(_))));
}

#[test]
fn test_invalid_table_name_rejected() {
    let path = write_config("invalid", "[tables]\nobs = \"obs where 1=1\"\n");

    let result = Settings::from_file(&path);
    fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(SettingsError::InvalidTableName { .. })));
}

#[test]
fn test_load_from_env_var() {
    let path = write_config("env", "[tables]\nobs = \"observations\"\n");
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let result = Settings::load();
    std::env::remove_var(CONFIG_ENV_VAR);
    fs::remove_file(&path).unwrap();

    let settings = result.unwrap();
    assert_eq!(settings.tables.obs.as_deref(), Some("observations"));
}

#[test]
fn test_loaded_tables_drive_compilation() {
    let path = write_config("compile", "[tables]\nobs = \"observations\"\n");
    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let filter = EntityFilter::Observation(ObsFilter::new().with_data_stream_ids([1]));
    let output = compile_filter(&filter, CompileContext::new(&settings.tables)).unwrap();

    assert_eq!(
        output.sql,
        "SELECT observations.* FROM observations WHERE observations.datastreamid = 1"
    );
}
