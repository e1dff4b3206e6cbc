//! # Engine Configuration
//!
//! This module defines the configuration structure for the `patscope` engine and
//! provides the logic for loading it from an optional `patscope.yml` file and
//! environment variables. Every field has a default, so an engine can always be
//! built even when no file is present.

use crate::analytics::rolling::{RollingStat, RollingWindow};
use crate::constants::*;
use crate::errors::ConfigError;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Which parsed dates a record needs before it takes part in temporal analytics.
///
/// The two modes give materially different year-over-year counts for recent
/// filings, whose priority data often lags behind the application itself.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemporalEligibility {
    /// Only `ApplicationDate` must parse. `PriorityMonth` may be absent.
    #[default]
    ApplicationDateOnly,
    /// Both `ApplicationDate` and `PriorityDate` must parse.
    ApplicationAndPriority,
}

/// Defaults for trailing-window aggregation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RollingConfig {
    pub window: usize,
    pub stat: RollingStat,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_ROLLING_WINDOW,
            stat: RollingStat::Sum,
        }
    }
}

/// Publication-lag policy: how long each group of application types stays
/// unpublished after filing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LagConfig {
    pub short_months: u32,
    pub short_types: Vec<String>,
    pub long_months: u32,
    pub long_types: Vec<String>,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            short_months: SHORT_LAG_MONTHS,
            short_types: vec!["4".to_string(), "5".to_string()],
            long_months: LONG_LAG_MONTHS,
            long_types: vec!["1".to_string()],
        }
    }
}

/// Header names of the columns the engine reads directly.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub application_number: String,
    pub application_date: String,
    pub priority_date: String,
    pub agent_name: String,
    pub application_type: String,
    pub classification: String,
    pub title: String,
    pub abstract_text: String,
    pub applicant: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            application_number: COL_APPLICATION_NUMBER.to_string(),
            application_date: COL_APPLICATION_DATE.to_string(),
            priority_date: COL_PRIORITY_DATE.to_string(),
            agent_name: COL_AGENT_NAME.to_string(),
            application_type: COL_APPLICATION_TYPE.to_string(),
            classification: COL_CLASSIFICATION.to_string(),
            title: COL_TITLE.to_string(),
            abstract_text: COL_ABSTRACT.to_string(),
            applicant: COL_APPLICANT.to_string(),
        }
    }
}

impl ColumnConfig {
    /// The columns without which normalization cannot run.
    pub fn required(&self) -> [&str; 6] {
        [
            &self.application_number,
            &self.application_date,
            &self.priority_date,
            &self.agent_name,
            &self.application_type,
            &self.classification,
        ]
    }
}

/// The root configuration structure, mapping directly to `patscope.yml`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Path of the export to load. Overridden by `PATSCOPE_SOURCE_PATH`.
    pub source_path: String,
    pub eligibility: TemporalEligibility,
    pub rolling: RollingConfig,
    pub lag: LagConfig,
    pub columns: ColumnConfig,
    /// chrono formats tried in order after RFC 3339.
    pub date_formats: Vec<String>,
    /// Extra tokens, matched case-insensitively, that never become facts.
    pub extra_invalid_classifications: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_path: DEFAULT_SOURCE_PATH.to_string(),
            eligibility: TemporalEligibility::default(),
            rolling: RollingConfig::default(),
            lag: LagConfig::default(),
            columns: ColumnConfig::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            extra_invalid_classifications: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// The full upper-cased sentinel set used by the classification expander.
    pub fn invalid_classifications(&self) -> HashSet<String> {
        INVALID_CLASSIFICATIONS
            .iter()
            .map(|t| t.to_string())
            .chain(
                self.extra_invalid_classifications
                    .iter()
                    .map(|t| t.trim().to_uppercase()),
            )
            .collect()
    }

    /// The configured default rolling window.
    pub fn rolling_window(&self) -> RollingWindow {
        RollingWindow {
            size: self.rolling.window,
            stat: self.rolling.stat,
        }
    }
}

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the engine configuration from defaults, a YAML file and the environment.
///
/// Layers, lowest priority first:
/// 1. Built-in defaults.
/// 2. `config_path_override` if given (it must exist), otherwise `patscope.yml`
///    in the working directory when present.
/// 3. `PATSCOPE_`-prefixed environment variables, with `__` separating nested
///    keys (e.g. `PATSCOPE_ROLLING__WINDOW=6`). A `.env` file is honoured.
pub fn get_config(config_path_override: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?
                .ok_or_else(|| ConfigError::NotFound(path.to_string()))?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            if let Some(content) = read_and_substitute(DEFAULT_CONFIG_FILE)? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                debug!("No '{DEFAULT_CONFIG_FILE}' found; using defaults.");
            }
        }
    }

    dotenvy::dotenv().ok();

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
