use thiserror::Error;

/// Errors raised while reading a patent export into a [`crate::Dataset`].
///
/// Only the `try_*` loaders return these. The public `load_*` entry points
/// downgrade every variant to an empty dataset so callers can render a
/// "no data" state instead of failing.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("The source file does not exist: {0}")]
    SourceNotFound(String),
    #[error("The source is empty: {0}")]
    EmptySource(String),
    #[error("Failed to read the source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV from the source: {0}")]
    Csv(#[from] csv::Error),
    #[error("The source is missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("The source has a header but no data rows.")]
    NoRows,
}

/// Errors raised while resolving an [`crate::config::EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    General(#[from] config::ConfigError),
}
