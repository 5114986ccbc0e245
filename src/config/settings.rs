//! TOML-based configuration for obsql.
//!
//! Supports a config file (obsql.toml) naming the table behind each entity
//! kind. Entity kinds without a table have no linked store: filters that
//! need one either fall back to foreign-key conditions or fail.
//!
//! Example configuration:
//! ```toml
//! [tables]
//! obs = "sensors.obs"
//! datastream = "sensors.datastreams"
//! foi = "sensors.features"
//! commandstream = "sensors.commandstreams"
//! command = "sensors.commands"
//! # system left out: no linked system store
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::filter::EntityKind;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "OBSQL_CONFIG";

/// Default observation table name.
pub const DEFAULT_OBS_TABLE: &str = "obs";

/// Plain or schema-qualified SQL identifier.
static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap()
});

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid table name for {entity}: {name:?}")]
    InvalidTableName { entity: EntityKind, name: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Table names per entity kind.
    pub tables: TableNames,
}

/// Table name per entity kind; `None` means no store is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableNames {
    pub obs: Option<String>,
    pub datastream: Option<String>,
    pub foi: Option<String>,
    pub system: Option<String>,
    pub commandstream: Option<String>,
    pub command: Option<String>,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            obs: Some(DEFAULT_OBS_TABLE.to_string()),
            datastream: None,
            foi: None,
            system: None,
            commandstream: None,
            command: None,
        }
    }
}

impl TableNames {
    /// No table configured at all, not even the observation table.
    pub fn none() -> Self {
        Self {
            obs: None,
            datastream: None,
            foi: None,
            system: None,
            commandstream: None,
            command: None,
        }
    }

    pub fn with_obs(mut self, table: &str) -> Self {
        self.obs = Some(table.to_string());
        self
    }

    pub fn with_datastream(mut self, table: &str) -> Self {
        self.datastream = Some(table.to_string());
        self
    }

    pub fn with_foi(mut self, table: &str) -> Self {
        self.foi = Some(table.to_string());
        self
    }

    pub fn with_system(mut self, table: &str) -> Self {
        self.system = Some(table.to_string());
        self
    }

    pub fn with_command_stream(mut self, table: &str) -> Self {
        self.commandstream = Some(table.to_string());
        self
    }

    pub fn with_command(mut self, table: &str) -> Self {
        self.command = Some(table.to_string());
        self
    }

    /// Table storing `entity`, if configured.
    ///
    /// Observation statistics are computed over the observation table.
    pub fn table_for(&self, entity: EntityKind) -> Option<&str> {
        match entity {
            EntityKind::Observation | EntityKind::ObservationStatistics => self.obs.as_deref(),
            EntityKind::DataStream => self.datastream.as_deref(),
            EntityKind::FeatureOfInterest => self.foi.as_deref(),
            EntityKind::System => self.system.as_deref(),
            EntityKind::CommandStream => self.commandstream.as_deref(),
            EntityKind::Command => self.command.as_deref(),
        }
    }

    /// Configured tables, in entity order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str)> {
        [
            EntityKind::Observation,
            EntityKind::DataStream,
            EntityKind::FeatureOfInterest,
            EntityKind::System,
            EntityKind::CommandStream,
            EntityKind::Command,
        ]
        .into_iter()
        .filter_map(move |entity| self.table_for(entity).map(|table| (entity, table)))
    }

    /// Check every configured name is a plain or schema-qualified identifier.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (entity, name) in self.iter() {
            if !TABLE_NAME.is_match(name) {
                return Err(SettingsError::InvalidTableName {
                    entity,
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.tables.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `OBSQL_CONFIG`
    /// 2. `./obsql.toml`
    /// 3. `~/.config/obsql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("obsql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("obsql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}
