//! # Search Logic
//!
//! This module provides the free-text boolean query engine. A query has three
//! levels:
//!
//! ```text
//! Query    := Disjunct (' OR ' Disjunct)*
//! Disjunct := Conjunct (' AND ' Conjunct)*
//! Conjunct := ['NOT '] Term
//! ```
//!
//! Operators are split on literally, with surrounding spaces and in upper case.
//! Terms match by case-insensitive substring containment against the record's
//! haystack (all raw fields joined), not by whole words, so `AI` matches
//! `said`. Dangling operators leave an empty term, which matches everything.
//!
//! Per-field filters are ANDed with the query; each one is a case-insensitive
//! substring test against a single column.

use crate::types::{FieldValue, PatentRecord, Schema};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Column name -> needle. Entries whose needle is blank are ignored.
pub type FieldFilters = BTreeMap<String, String>;

const OR_TOKEN: &str = " OR ";
const AND_TOKEN: &str = " AND ";
const NOT_PREFIX: &str = "NOT ";

/// A single term of a disjunct. Terms are stored lower-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conjunct {
    /// Satisfied when the term occurs in the haystack.
    Contains(String),
    /// Satisfied when the term does not occur in the haystack.
    Excludes(String),
}

impl Conjunct {
    fn parse(text: &str) -> Self {
        match text.strip_prefix(NOT_PREFIX) {
            Some(rest) => Conjunct::Excludes(rest.trim().to_lowercase()),
            None => Conjunct::Contains(text.trim().to_lowercase()),
        }
    }

    fn is_satisfied(&self, haystack: &str) -> bool {
        match self {
            Conjunct::Contains(term) => haystack.contains(term.as_str()),
            Conjunct::Excludes(term) => !haystack.contains(term.as_str()),
        }
    }
}

/// A parsed OR-of-ANDs query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BooleanQuery {
    disjuncts: Vec<Vec<Conjunct>>,
}

impl BooleanQuery {
    /// Parses a query string. Parsing never fails.
    pub fn parse(query: &str) -> Self {
        if query.is_empty() {
            return Self::default();
        }
        let disjuncts = query
            .split(OR_TOKEN)
            .map(|part| part.split(AND_TOKEN).map(Conjunct::parse).collect())
            .collect();
        Self { disjuncts }
    }

    /// Whether the query was empty and therefore matches every record.
    pub fn is_match_all(&self) -> bool {
        self.disjuncts.is_empty()
    }

    pub fn disjuncts(&self) -> &[Vec<Conjunct>] {
        &self.disjuncts
    }

    /// Evaluates the query against an already lower-cased haystack.
    pub fn matches(&self, haystack: &str) -> bool {
        self.is_match_all()
            || self
                .disjuncts
                .iter()
                .any(|conjuncts| conjuncts.iter().all(|c| c.is_satisfied(haystack)))
    }
}

/// Case-insensitive substring test of one field. Missing values never match.
pub fn field_contains(value: Option<&FieldValue>, needle: &str) -> bool {
    match value.and_then(FieldValue::as_str) {
        Some(text) => text.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    }
}

/// Returns the records satisfying `query` and every active field filter, in
/// their original order.
pub fn search_records<'a>(
    schema: &Schema,
    records: &'a [PatentRecord],
    query: &str,
    filters: &FieldFilters,
) -> Vec<&'a PatentRecord> {
    let parsed = BooleanQuery::parse(query);

    let mut active: Vec<(Option<usize>, String)> = Vec::new();
    for (column, needle) in filters {
        if needle.trim().is_empty() {
            continue;
        }
        let index = schema.index_of(column);
        if index.is_none() {
            warn!("Filter on unknown column '{column}' matches no records.");
        }
        active.push((index, needle.to_lowercase()));
    }

    let results: Vec<&PatentRecord> = records
        .iter()
        .filter(|record| parsed.matches(record.haystack()))
        .filter(|record| {
            active.iter().all(|(index, needle)| {
                let value = index.and_then(|i| record.fields.get(i));
                field_contains(value, needle)
            })
        })
        .collect();

    debug!(
        "Query {:?} with {} active filters matched {} of {} records.",
        query,
        active.len(),
        results.len(),
        records.len()
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_levels() {
        let q = BooleanQuery::parse("AI AND Hydrogen OR NOT Battery");
        assert_eq!(
            q.disjuncts(),
            &[
                vec![
                    Conjunct::Contains("ai".into()),
                    Conjunct::Contains("hydrogen".into())
                ],
                vec![Conjunct::Excludes("battery".into())],
            ]
        );
    }

    #[test]
    fn operators_are_case_sensitive() {
        let q = BooleanQuery::parse("fuel and cell");
        assert_eq!(q.disjuncts(), &[vec![Conjunct::Contains("fuel and cell".into())]]);
        let q = BooleanQuery::parse("not battery");
        assert_eq!(q.disjuncts(), &[vec![Conjunct::Contains("not battery".into())]]);
    }

    #[test]
    fn dangling_operator_leaves_empty_term() {
        let q = BooleanQuery::parse("solar AND ");
        assert_eq!(
            q.disjuncts(),
            &[vec![Conjunct::Contains("solar".into()), Conjunct::Contains(String::new())]]
        );
        assert!(q.matches("a solar panel"));
        assert!(!q.matches("a wind turbine"));
    }

    #[test]
    fn substring_not_word_match() {
        assert!(BooleanQuery::parse("AI").matches("it is said"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let q = BooleanQuery::parse("");
        assert!(q.is_match_all());
        assert!(q.matches(""));
    }

    #[test]
    fn field_contains_handles_missing() {
        assert!(!field_contains(Some(&FieldValue::Missing), "x"));
        assert!(!field_contains(None, "x"));
        assert!(field_contains(Some(&FieldValue::Present("Fuel Cell".into())), "CELL"));
    }
}
