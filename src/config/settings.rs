//! TOML-based configuration for gsod-query.
//!
//! Supports a config file (gsod-query.toml) with environment variable
//! expansion in table paths. Every field has a default, so an empty file
//! (or no file) targets the public GSOD tables on BigQuery.
//!
//! Example configuration:
//! ```toml
//! [warehouse]
//! dialect = "bigquery"
//! measurements_table = "${GCP_PROJECT}.noaa_gsod.gsod2024"
//! stations_table = "bigquery-public-data.noaa_gsod.stations"
//!
//! [query]
//! max_rows = 10000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::DEFAULT_MAX_ROWS;
use crate::schema::{DEFAULT_MEASUREMENTS_TABLE, DEFAULT_STATIONS_TABLE};
use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GSOD_QUERY_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Target warehouse.
    pub warehouse: WarehouseSettings,

    /// Query limits.
    pub query: QuerySettings,
}

/// Where the GSOD tables live and which SQL dialect to emit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WarehouseSettings {
    /// SQL dialect (bigquery, duckdb, postgres).
    pub dialect: Dialect,

    /// Dotted path of the daily measurements table (supports ${ENV_VAR} expansion).
    pub measurements_table: String,

    /// Dotted path of the station metadata table (supports ${ENV_VAR} expansion).
    pub stations_table: String,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::BigQuery,
            measurements_table: DEFAULT_MEASUREMENTS_TABLE.to_string(),
            stations_table: DEFAULT_STATIONS_TABLE.to_string(),
        }
    }
}

/// Query limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// LIMIT applied to every generated query.
    pub max_rows: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text, expand environment variables and check them.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.warehouse.measurements_table =
            expand_env_vars(&settings.warehouse.measurements_table)?;
        settings.warehouse.stations_table = expand_env_vars(&settings.warehouse.stations_table)?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GSOD_QUERY_CONFIG`
    /// 2. `./gsod-query.toml`
    /// 3. `~/.config/gsod-query/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("gsod-query.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gsod-query").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn check(&self) -> Result<(), SettingsError> {
        if self.query.max_rows == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.max_rows must be greater than zero".to_string(),
            ));
        }

        for (key, path) in [
            ("warehouse.measurements_table", &self.warehouse.measurements_table),
            ("warehouse.stations_table", &self.warehouse.stations_table),
        ] {
            if path.split('.').any(|part| part.trim().is_empty()) {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} has an empty path segment: '{}'",
                    key, path
                )));
            }
        }

        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            // ${VAR}
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
