//! Summary reports built on top of the record and fact tables.
//!
//! These back the fixed dashboard views: the annual summary table, the firm
//! and classification breakdowns, and the per-year monthly distribution. All
//! of them take an already-filtered record subset and read the dataset
//! without mutating it.

use crate::constants::DIRECT_FILING;
use crate::dataset::Dataset;
use crate::types::PatentRecord;
use chrono::Month;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Year x application-type counts, most recent year first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnualSummary {
    pub years: Vec<i32>,
    pub application_types: Vec<String>,
    /// `counts[y][t]` is the count for `years[y]` and `application_types[t]`.
    pub counts: Vec<Vec<usize>>,
}

impl AnnualSummary {
    pub fn get(&self, year: i32, application_type: &str) -> Option<usize> {
        let y = self.years.iter().position(|v| *v == year)?;
        let t = self
            .application_types
            .iter()
            .position(|v| v == application_type)?;
        Some(self.counts[y][t])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmCount {
    pub firm: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmClassCount {
    pub firm: String,
    pub class3: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandscapeCell {
    pub section: String,
    pub class3: String,
    /// Number of facts in the cell.
    pub facts: usize,
    /// Number of distinct firms behind those facts.
    pub firms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub section: String,
    pub count: usize,
}

/// Counts temporally eligible records per year and application type.
pub fn annual_summary(records: &[&PatentRecord]) -> AnnualSummary {
    let mut cells: BTreeMap<(i32, &str), usize> = BTreeMap::new();
    let mut types: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        if let Some(year) = record.year() {
            *cells
                .entry((year, record.application_type.as_str()))
                .or_default() += 1;
            types.insert(&record.application_type);
        }
    }
    let years: Vec<i32> = cells
        .keys()
        .map(|(y, _)| *y)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    let counts = years
        .iter()
        .map(|y| {
            types
                .iter()
                .map(|t| cells.get(&(*y, *t)).copied().unwrap_or(0))
                .collect()
        })
        .collect();
    AnnualSummary {
        years,
        application_types: types.into_iter().map(String::from).collect(),
        counts,
    }
}

/// Counts of `year`'s records per month, January to December, zero-filled.
pub fn monthly_distribution(records: &[&PatentRecord], year: i32) -> Vec<MonthCount> {
    let mut by_month: HashMap<&str, usize> = HashMap::new();
    for temporal in records.iter().filter_map(|r| r.temporal.as_ref()) {
        if temporal.year == year {
            *by_month.entry(temporal.month_name).or_default() += 1;
        }
    }
    let mut month = Month::January;
    (0..12)
        .map(|_| {
            let name = month.name();
            month = month.succ();
            MonthCount {
                month: name,
                count: by_month.get(name).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// The `n` firms with the most records, excluding direct filings.
/// Ties are broken alphabetically.
pub fn top_firms(records: &[&PatentRecord], n: usize) -> Vec<FirmCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.firm != DIRECT_FILING) {
        *counts.entry(&record.firm).or_default() += 1;
    }
    let mut ranked: Vec<FirmCount> = counts
        .into_iter()
        .map(|(firm, count)| FirmCount {
            firm: firm.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.firm.cmp(&b.firm)));
    ranked.truncate(n);
    ranked
}

/// Classification-class fact counts for the chosen firms.
pub fn firm_class_strengths(
    dataset: &Dataset,
    records: &[&PatentRecord],
    firms: &[String],
) -> Vec<FirmClassCount> {
    let chosen: HashSet<&str> = firms.iter().map(String::as_str).collect();
    let firm_of: HashMap<&str, &str> = records
        .iter()
        .filter(|r| r.firm != DIRECT_FILING && chosen.contains(r.firm.as_str()))
        .map(|r| (r.application_number.as_str(), r.firm.as_str()))
        .collect();

    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for fact in dataset.facts() {
        if let Some(firm) = firm_of.get(fact.application_number.as_str()) {
            *counts.entry((*firm, fact.class3.as_str())).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|((firm, class3), count)| FirmClassCount {
            firm: firm.to_string(),
            class3: class3.to_string(),
            count,
        })
        .collect()
}

/// Fact counts and distinct firm counts per (section, class).
pub fn landscape(dataset: &Dataset, records: &[&PatentRecord]) -> Vec<LandscapeCell> {
    let firm_of: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.application_number.as_str(), r.firm.as_str()))
        .collect();

    let mut cells: BTreeMap<(&str, &str), (usize, HashSet<&str>)> = BTreeMap::new();
    for fact in dataset.facts() {
        if let Some(firm) = firm_of.get(fact.application_number.as_str()) {
            let cell = cells
                .entry((fact.section.as_str(), fact.class3.as_str()))
                .or_default();
            cell.0 += 1;
            cell.1.insert(*firm);
        }
    }
    cells
        .into_iter()
        .map(|((section, class3), (facts, firms))| LandscapeCell {
            section: section.to_string(),
            class3: class3.to_string(),
            facts,
            firms: firms.len(),
        })
        .collect()
}

/// Fact counts per classification section, ordered by section key.
pub fn section_counts(dataset: &Dataset, records: &[&PatentRecord]) -> Vec<SectionCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for fact in dataset.facts_for(records) {
        *counts.entry(fact.section.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(section, count)| SectionCount {
            section: section.to_string(),
            count,
        })
        .collect()
}

/// Records carrying at least one code of `class3`. `None` keeps records with any code.
pub fn records_with_class<'a>(
    dataset: &Dataset,
    records: &[&'a PatentRecord],
    class3: Option<&str>,
) -> Vec<&'a PatentRecord> {
    let owners: HashSet<&str> = dataset
        .facts()
        .iter()
        .filter(|f| class3.map_or(true, |c| f.class3 == c))
        .map(|f| f.application_number.as_str())
        .collect();
    records
        .iter()
        .copied()
        .filter(|r| owners.contains(r.application_number.as_str()))
        .collect()
}

/// Records whose application type is one of `types`.
pub fn with_application_types<'a>(
    records: &[&'a PatentRecord],
    types: &[String],
) -> Vec<&'a PatentRecord> {
    records
        .iter()
        .copied()
        .filter(|r| types.contains(&r.application_type))
        .collect()
}

/// Sorted years present among temporally eligible records.
pub fn distinct_years(records: &[&PatentRecord]) -> Vec<i32> {
    records
        .iter()
        .filter_map(|r| r.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn distinct_application_types(records: &[&PatentRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.application_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted classification classes carried by `records`.
pub fn distinct_classes(dataset: &Dataset, records: &[&PatentRecord]) -> Vec<String> {
    dataset
        .facts_for(records)
        .into_iter()
        .map(|f| f.class3.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parses a comma-separated list of years such as `"2019, 2021,2022"`.
///
/// Tokens that are not plain digit strings are ignored. When nothing usable
/// remains the whole of `available` is returned.
pub fn parse_year_selection(input: &str, available: &[i32]) -> Vec<i32> {
    let years: Vec<i32> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .collect();
    if years.is_empty() {
        available.to_vec()
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_selection_falls_back_to_available() {
        let available = [2019, 2020, 2021];
        assert_eq!(parse_year_selection("", &available), available.to_vec());
        assert_eq!(parse_year_selection("abc, -1", &available), available.to_vec());
        assert_eq!(parse_year_selection("2021, x, 2019 ", &available), vec![2021, 2019]);
        assert_eq!(parse_year_selection("99999999999", &available), available.to_vec());
    }
}
