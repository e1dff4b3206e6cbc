//! # Classification Expansion
//!
//! Explodes each record's comma-separated classification string into one
//! [`ClassificationFact`] per surviving code. The expansion is a pure function
//! of its input, so running it again over the same records yields the same
//! fact table.

use crate::types::{ClassificationFact, FieldValue, PatentRecord};
use std::collections::HashSet;
use tracing::debug;

/// Splits a classification cell into cleaned codes, dropping sentinel tokens.
///
/// `invalid` must hold upper-cased tokens; matching is by equality after the
/// token is trimmed and upper-cased. A code repeated within one cell is kept
/// once, at its first position.
pub fn clean_codes(value: &FieldValue, invalid: &HashSet<String>) -> Vec<String> {
    let Some(text) = value.as_str() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    text.split(',')
        .map(|token| token.trim().to_uppercase())
        .filter(|code| !invalid.contains(code))
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

/// Builds a fact row for one cleaned code.
pub fn fact_for(application_number: &str, code: String) -> ClassificationFact {
    let section: String = code.chars().take(1).collect();
    let class3: String = code.chars().take(3).collect();
    ClassificationFact {
        application_number: application_number.to_string(),
        code,
        section,
        class3,
    }
}

/// Expands the classification column of every record into the fact table.
///
/// `column` is the record field index of the classification column. Records
/// whose codes are all sentinels contribute no facts.
pub fn expand_classifications(
    records: &[PatentRecord],
    column: usize,
    invalid: &HashSet<String>,
) -> Vec<ClassificationFact> {
    let facts: Vec<ClassificationFact> = records
        .iter()
        .flat_map(|record| {
            let cell = record.fields.get(column).unwrap_or(&FieldValue::Missing);
            clean_codes(cell, invalid)
                .into_iter()
                .map(move |code| fact_for(&record.application_number, code))
        })
        .collect();
    debug!(
        "Expanded {} records into {} classification facts.",
        records.len(),
        facts.len()
    );
    facts
}
