//! # Record Normalization
//!
//! Turns raw export rows into [`PatentRecord`]s: parses the application and
//! priority dates, derives the calendar buckets used by analytics, and
//! normalizes the filing agent into a firm identity. Malformed dates never
//! fail the load; they only shrink the analytics-eligible subset.

use crate::config::{EngineConfig, TemporalEligibility};
use crate::constants::{DIRECT_FILING, PLACEHOLDER_TOKENS};
use crate::errors::LoadError;
use crate::ingest::schema::RawTable;
use crate::types::{FieldValue, PatentRecord, Schema, TemporalFields};
use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::{info, warn};

/// Positions of the columns normalization reads.
struct ColumnIndexes {
    application_number: usize,
    application_date: usize,
    priority_date: usize,
    agent_name: usize,
    application_type: usize,
}

impl ColumnIndexes {
    fn resolve(schema: &Schema, config: &EngineConfig) -> Result<Self, LoadError> {
        let missing: Vec<String> = config
            .columns
            .required()
            .iter()
            .filter(|c| schema.index_of(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
        let at = |c: &str| schema.index_of(c).unwrap_or_default();
        let cols = &config.columns;
        Ok(Self {
            application_number: at(&cols.application_number),
            application_date: at(&cols.application_date),
            priority_date: at(&cols.priority_date),
            agent_name: at(&cols.agent_name),
            application_type: at(&cols.application_type),
        })
    }
}

/// Parses a date cell, trying RFC 3339 first and then each format in order.
///
/// Returns `None` for missing, empty or unparseable values.
pub fn parse_date(value: &FieldValue, formats: &[String]) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date()))
    })
}

/// The first day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The English name of the month containing `date`.
pub fn month_name(date: NaiveDate) -> &'static str {
    Month::try_from(date.month() as u8)
        .map(|m| m.name())
        .unwrap_or_default()
}

fn is_placeholder(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    PLACEHOLDER_TOKENS.contains(&upper.as_str())
}

/// Normalizes an agent name into a firm identity.
///
/// Names are trimmed and upper-cased; absent and placeholder values all
/// collapse into [`DIRECT_FILING`].
pub fn normalize_firm(value: &FieldValue) -> String {
    match value.as_str() {
        Some(name) if !is_placeholder(name) => name.trim().to_uppercase(),
        _ => DIRECT_FILING.to_string(),
    }
}

fn derive_temporal(
    application_date: Option<NaiveDate>,
    priority_date: Option<NaiveDate>,
    eligibility: TemporalEligibility,
) -> Option<TemporalFields> {
    let app = application_date?;
    if eligibility == TemporalEligibility::ApplicationAndPriority && priority_date.is_none() {
        return None;
    }
    Some(TemporalFields {
        year: app.year(),
        month_name: month_name(app),
        arrival_month: month_start(app),
        priority_month: priority_date.map(month_start),
    })
}

fn build_haystack(fields: &[FieldValue]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes every row of a raw table.
///
/// Rows without an application number are dropped, and a repeated application
/// number keeps only its first row, so every returned record has a unique,
/// non-empty key.
pub fn normalize_table(
    table: RawTable,
    config: &EngineConfig,
) -> Result<(Schema, Vec<PatentRecord>), LoadError> {
    let RawTable { schema, rows } = table;
    let idx = ColumnIndexes::resolve(&schema, config)?;

    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    let (mut unkeyed, mut duplicates, mut undated) = (0usize, 0usize, 0usize);

    let width = schema.len();
    for mut fields in rows {
        fields.resize(width, FieldValue::Missing);
        let application_number = match fields[idx.application_number].as_str() {
            Some(number) if !is_placeholder(number) => number.trim().to_string(),
            _ => {
                unkeyed += 1;
                continue;
            }
        };
        if !seen.insert(application_number.clone()) {
            duplicates += 1;
            continue;
        }

        let application_date = parse_date(&fields[idx.application_date], &config.date_formats);
        let priority_date = parse_date(&fields[idx.priority_date], &config.date_formats);
        let temporal = derive_temporal(application_date, priority_date, config.eligibility);
        if temporal.is_none() {
            undated += 1;
        }

        let application_type = fields[idx.application_type]
            .as_str()
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| "-".to_string());

        records.push(PatentRecord {
            application_number,
            firm: normalize_firm(&fields[idx.agent_name]),
            application_type,
            application_date,
            priority_date,
            temporal,
            haystack: build_haystack(&fields),
            fields,
        });
    }

    if unkeyed > 0 {
        warn!("Dropped {unkeyed} rows without an application number.");
    }
    if duplicates > 0 {
        warn!("Dropped {duplicates} rows with a repeated application number.");
    }
    info!(
        "Normalized {} records; {} eligible for temporal analytics ({undated} excluded, mode {:?}).",
        records.len(),
        records.len() - undated,
        config.eligibility
    );

    Ok((schema, records))
}
