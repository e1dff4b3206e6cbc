//! # Dataset Snapshot
//!
//! A [`Dataset`] is the immutable product of one load: the schema, every
//! normalized record (the search table) and the classification fact table.
//! Query and analytics functions borrow it and never mutate it, so several
//! datasets (or test fixtures) can live side by side.
//!
//! [`DatasetCache`] keeps one snapshot per source path and rebuilds it only
//! when the file content or the engine configuration changes.

use crate::config::{ColumnConfig, EngineConfig, TemporalEligibility};
use crate::errors::LoadError;
use crate::ingest::{
    expand_classifications, normalize_table, read_source_bytes, read_table, RawTable,
};
use crate::search::{search_records, FieldFilters};
use crate::types::{ClassificationFact, FieldCategory, FieldValue, PatentRecord, Schema};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The detail view of one record: headline fields plus the Enriched and Raw
/// panels, with the headline columns and the type left out of the Raw panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dossier<'a> {
    pub application_number: &'a str,
    pub title: Option<&'a FieldValue>,
    pub abstract_text: Option<&'a FieldValue>,
    pub applicant: Option<&'a FieldValue>,
    /// Normalized type code, shown as a badge rather than in the Raw panel.
    pub application_type: &'a str,
    pub enriched: Vec<(&'a str, &'a FieldValue)>,
    pub raw: Vec<(&'a str, &'a FieldValue)>,
}

/// The loaded, read-only patent dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<PatentRecord>,
    facts: Vec<ClassificationFact>,
    positions: HashMap<String, usize>,
    eligibility: TemporalEligibility,
}

impl Dataset {
    /// A dataset with no columns, records or facts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalizes a raw table and expands its classifications.
    pub fn from_raw_table(table: RawTable, config: &EngineConfig) -> Result<Self, LoadError> {
        let (schema, records) = normalize_table(table, config)?;
        let classification_column = schema
            .index_of(&config.columns.classification)
            .ok_or_else(|| LoadError::MissingColumns(vec![config.columns.classification.clone()]))?;
        let facts = expand_classifications(
            &records,
            classification_column,
            &config.invalid_classifications(),
        );
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.application_number.clone(), i))
            .collect();
        Ok(Self {
            schema,
            records,
            facts,
            positions,
            eligibility: config.eligibility,
        })
    }

    /// Parses an export from any reader.
    pub fn try_from_reader<R: Read>(source: R, config: &EngineConfig) -> Result<Self, LoadError> {
        Self::from_raw_table(read_table(source)?, config)
    }

    /// Parses an export from any reader, yielding an empty dataset on failure.
    pub fn from_reader<R: Read>(source: R, config: &EngineConfig) -> Self {
        Self::try_from_reader(source, config).unwrap_or_else(|e| {
            warn!("Export could not be loaded, continuing with an empty dataset: {e}");
            Self::empty()
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Every normalized record, in source order.
    pub fn records(&self) -> &[PatentRecord] {
        &self.records
    }

    /// The exploded (record x classification code) table.
    pub fn facts(&self) -> &[ClassificationFact] {
        &self.facts
    }

    pub fn eligibility(&self) -> TemporalEligibility {
        self.eligibility
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by application number.
    pub fn get(&self, application_number: &str) -> Option<&PatentRecord> {
        self.positions
            .get(application_number)
            .map(|&i| &self.records[i])
    }

    /// Records eligible for temporal analytics.
    pub fn temporal_records(&self) -> Vec<&PatentRecord> {
        self.records.iter().filter(|r| r.is_temporal()).collect()
    }

    /// The facts owned by any of `records`.
    pub fn facts_for(&self, records: &[&PatentRecord]) -> Vec<&ClassificationFact> {
        let owners: HashSet<&str> = records
            .iter()
            .map(|r| r.application_number.as_str())
            .collect();
        self.facts
            .iter()
            .filter(|f| owners.contains(f.application_number.as_str()))
            .collect()
    }

    /// The value of `column` for `record`, or `None` for unknown columns.
    pub fn field<'a>(&self, record: &'a PatentRecord, column: &str) -> Option<&'a FieldValue> {
        self.schema
            .index_of(column)
            .and_then(|i| record.fields.get(i))
    }

    /// The `(column, value)` pairs of one category for `record`, in header
    /// order, skipping the columns named in `exclude`.
    pub fn fields_in_category<'a>(
        &'a self,
        record: &'a PatentRecord,
        category: &FieldCategory,
        exclude: &[&str],
    ) -> Vec<(&'a str, &'a FieldValue)> {
        self.schema
            .columns_in(category)
            .into_iter()
            .filter(|column| !exclude.contains(column))
            .filter_map(|column| self.field(record, column).map(|value| (column, value)))
            .collect()
    }

    /// Builds the dossier of the record keyed by `application_number`.
    pub fn dossier<'a>(
        &'a self,
        application_number: &str,
        columns: &ColumnConfig,
    ) -> Option<Dossier<'a>> {
        let record = self.get(application_number)?;
        let headline = [
            columns.title.as_str(),
            columns.abstract_text.as_str(),
            columns.application_type.as_str(),
        ];
        Some(Dossier {
            application_number: &record.application_number,
            title: self.field(record, &columns.title),
            abstract_text: self.field(record, &columns.abstract_text),
            applicant: self.field(record, &columns.applicant),
            application_type: &record.application_type,
            enriched: self.fields_in_category(record, &FieldCategory::Enriched, &[]),
            raw: self.fields_in_category(record, &FieldCategory::Raw, &headline),
        })
    }

    /// Runs a boolean query plus per-field filters over every record.
    pub fn search(&self, query: &str, filters: &FieldFilters) -> Vec<&PatentRecord> {
        search_records(&self.schema, &self.records, query, filters)
    }
}

/// Loads an export from disk, propagating the reason when it cannot be read.
pub fn try_load_dataset(path: &Path, config: &EngineConfig) -> Result<Dataset, LoadError> {
    info!("Loading patent export from '{}'.", path.display());
    let bytes = read_source_bytes(path)?;
    Dataset::try_from_reader(bytes.as_slice(), config)
}

/// Loads an export from disk, yielding an empty dataset when it cannot be read.
pub fn load_dataset(path: &Path, config: &EngineConfig) -> Dataset {
    try_load_dataset(path, config).unwrap_or_else(|e| {
        warn!(
            "Export '{}' could not be loaded, continuing with an empty dataset: {e}",
            path.display()
        );
        Dataset::empty()
    })
}

struct CacheEntry {
    fingerprint: String,
    dataset: Arc<Dataset>,
}

/// Process-lifetime cache of loaded snapshots, keyed by source path.
///
/// Each lookup re-reads the file and compares an md5 fingerprint of its
/// content and the engine configuration; the expensive parse runs only when
/// the fingerprint changes.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot for `path`, loading or reloading it when needed.
    ///
    /// Unreadable sources yield an empty dataset and evict any cached entry.
    pub fn get_or_load(&mut self, path: &Path, config: &EngineConfig) -> Arc<Dataset> {
        let bytes = match read_source_bytes(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    "Export '{}' could not be read, serving an empty dataset: {e}",
                    path.display()
                );
                self.entries.remove(path);
                return Arc::new(Dataset::empty());
            }
        };

        let fingerprint = fingerprint(&bytes, config);
        if let Some(entry) = self.entries.get(path) {
            if entry.fingerprint == fingerprint {
                debug!("Cache hit for '{}'.", path.display());
                return Arc::clone(&entry.dataset);
            }
            info!("Export '{}' changed; reloading.", path.display());
        }

        let dataset = Arc::new(Dataset::from_reader(bytes.as_slice(), config));
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                fingerprint,
                dataset: Arc::clone(&dataset),
            },
        );
        dataset
    }

    /// Drops the cached snapshot for `path`, if any.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fingerprint(content: &[u8], config: &EngineConfig) -> String {
    let config_json = serde_json::to_string(config).unwrap_or_default();
    format!(
        "{:x}-{:x}",
        md5::compute(content),
        md5::compute(config_json.as_bytes())
    )
}
