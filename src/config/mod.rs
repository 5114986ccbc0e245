//! Configuration module for obsql.
//!
//! Handles the table-name settings file and its lookup locations.

mod settings;

pub use settings::{Settings, SettingsError, TableNames, CONFIG_ENV_VAR, DEFAULT_OBS_TABLE};
