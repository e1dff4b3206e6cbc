//! # Patent Filing Search and Analytics
//!
//! This crate loads a patent-filing export (a CSV with a two-tier header of
//! column names and field categories) into an immutable [`Dataset`] and serves
//! two capabilities over it:
//!
//! 1.  **Search:** a free-text boolean query (`OR` / `AND` / `NOT`) across all
//!     fields, combined with per-field substring filters.
//! 2.  **Analytics:** counts grouped by classification, application type or
//!     firm over yearly or monthly buckets, trailing-window smoothing on a
//!     gap-free grid, and publication-lag cutoff markers.
//!
//! ```no_run
//! use patscope::{aggregate, load_dataset, AggregateRequest, EngineConfig, FieldFilters, GroupKey};
//! use std::path::Path;
//!
//! let config = EngineConfig::default();
//! let dataset = load_dataset(Path::new(&config.source_path), &config);
//! let hits = dataset.search("hydrogen AND NOT battery", &FieldFilters::new());
//! let table = aggregate(
//!     &dataset,
//!     &hits,
//!     &AggregateRequest {
//!         group_key: GroupKey::ClassificationClass,
//!         ..Default::default()
//!     },
//! );
//! println!("{} buckets", table.index.len());
//! ```

pub mod analytics;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod errors;
pub mod ingest;
pub mod search;
pub mod types;

pub use analytics::{
    aggregate, lag_cutoffs, AggregateRequest, GroupKey, LagCutoffs, RollingStat, RollingWindow,
    TimeBucket, TimeGranularity, TimeSeriesTable,
};
pub use config::{get_config, EngineConfig, TemporalEligibility};
pub use dataset::{load_dataset, try_load_dataset, Dataset, DatasetCache, Dossier};
pub use errors::{ConfigError, LoadError};
pub use search::{BooleanQuery, FieldFilters};
pub use types::{ClassificationFact, FieldCategory, FieldValue, PatentRecord, Schema};
