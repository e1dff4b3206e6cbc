//! # Schema Loading
//!
//! Parses the two-tier header of a patent export. The first CSV row holds the
//! column names, the second holds one category token per column ("Raw" or
//! "Enriched"), and records start on the third row.

use crate::errors::LoadError;
use crate::types::{FieldValue, Schema};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// The header and the un-normalized rows of an export.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub schema: Schema,
    /// One vector per data row, always exactly `schema.len()` cells long.
    pub rows: Vec<Vec<FieldValue>>,
}

/// Reads an export from disk.
pub fn read_table_from_path(path: &Path) -> Result<RawTable, LoadError> {
    let bytes = read_source_bytes(path)?;
    read_table(bytes.as_slice())
}

/// Reads the raw bytes of a source, rejecting absent and zero-length files.
pub fn read_source_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceNotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(LoadError::EmptySource(path.display().to_string()));
    }
    Ok(bytes)
}

/// Parses the two-tier header and the data rows from any reader.
///
/// Rows with more cells than the header are skipped, as are rows the CSV
/// reader cannot decode. Short rows are padded with [`FieldValue::Missing`].
pub fn read_table<R: Read>(source: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(LoadError::EmptySource("header row is empty".to_string()));
    }

    let mut records = reader.records();

    let category_tokens: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(|t| t.trim().to_string()).collect(),
        Some(Err(e)) => return Err(LoadError::Csv(e)),
        None => return Err(LoadError::NoRows),
    };
    let schema = Schema::new(columns, &category_tokens);

    let width = schema.len();
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in records.enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping undecodable row {}: {e}", line + 3);
                skipped += 1;
                continue;
            }
        };
        if record.len() > width {
            debug!(
                "Skipping row {} with {} cells (header has {width}).",
                line + 3,
                record.len()
            );
            skipped += 1;
            continue;
        }
        let mut cells: Vec<FieldValue> = record.iter().map(FieldValue::from_cell).collect();
        cells.resize(width, FieldValue::Missing);
        rows.push(cells);
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows while reading the export.");
    }
    if rows.is_empty() {
        return Err(LoadError::NoRows);
    }

    info!(
        "Read export with {} columns and {} data rows.",
        schema.len(),
        rows.len()
    );
    Ok(RawTable { schema, rows })
}
