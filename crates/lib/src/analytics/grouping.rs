//! Grouped time-bucket counts and their rolling reindexing.

use crate::analytics::lag::{CutoffMarker, LagCutoffs};
use crate::analytics::rolling::{rolling, RollingWindow};
use crate::constants::TOTAL_COLUMN;
use crate::dataset::Dataset;
use crate::types::{ClassificationFact, PatentRecord};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// What the columns of an aggregated table represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GroupKey {
    /// A single `ALL` column.
    #[default]
    None,
    ApplicationType,
    Firm,
    /// Three-character classification class. Counts facts, so a record with
    /// several codes is counted once per code.
    ClassificationClass,
    /// One-character classification section. Counts facts.
    ClassificationSection,
}

impl GroupKey {
    pub fn counts_facts(self) -> bool {
        matches!(
            self,
            GroupKey::ClassificationClass | GroupKey::ClassificationSection
        )
    }
}

/// Which date, at which resolution, places a record on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeGranularity {
    /// Calendar year of the application date.
    #[default]
    Year,
    /// Calendar month of the application date.
    ArrivalMonth,
    /// Calendar month of the priority date. Records without one are skipped.
    PriorityMonth,
}

/// A point on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TimeBucket {
    Year(i32),
    /// Identified by the first day of the month.
    Month(NaiveDate),
}

impl TimeBucket {
    pub fn start(&self) -> NaiveDate {
        match self {
            TimeBucket::Year(y) => NaiveDate::from_ymd_opt(*y, 1, 1).unwrap_or(NaiveDate::MIN),
            TimeBucket::Month(m) => *m,
        }
    }

    pub fn end(&self) -> NaiveDate {
        match self {
            TimeBucket::Year(y) => NaiveDate::from_ymd_opt(*y, 12, 31).unwrap_or(NaiveDate::MAX),
            TimeBucket::Month(m) => m
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(*m),
        }
    }

    pub fn year(&self) -> i32 {
        self.start().year()
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Year(y) => write!(f, "{y}"),
            TimeBucket::Month(m) => write!(f, "{}", m.format("%Y-%m")),
        }
    }
}

/// Parameters of one aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRequest {
    pub group_key: GroupKey,
    pub granularity: TimeGranularity,
    /// Years to keep. `None` keeps all; an empty selection yields an empty table.
    pub years: Option<Vec<i32>>,
    /// When set, counts are reindexed onto a gap-free grid and smoothed.
    pub rolling: Option<RollingWindow>,
}

/// A time-indexed table of counts, one column per group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeriesTable {
    pub group_key: GroupKey,
    pub index: Vec<TimeBucket>,
    /// Sorted group labels.
    pub columns: Vec<String>,
    /// `values[c][i]` is the value of column `c` at `index[i]`.
    pub values: Vec<Vec<f64>>,
    pub markers: Vec<CutoffMarker>,
    #[serde(skip)]
    cutoffs: Option<LagCutoffs>,
}

impl TimeSeriesTable {
    fn empty(group_key: GroupKey) -> Self {
        Self {
            group_key,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// The value at (`bucket`, `column`), or `None` when either is absent.
    pub fn get(&self, bucket: TimeBucket, column: &str) -> Option<f64> {
        let row = self.index.iter().position(|b| *b == bucket)?;
        self.column(column).map(|values| values[row])
    }

    /// Sum of every cell.
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Attaches publication-lag markers. The data itself is left untouched.
    pub fn annotate(mut self, cutoffs: &LagCutoffs) -> Self {
        self.markers = cutoffs.markers();
        self.cutoffs = Some(cutoffs.clone());
        self
    }

    /// Per row of `column`, whether the bucket reaches past the lag cutoff.
    ///
    /// Columns are matched to an application type only when the table is
    /// grouped by type; otherwise the longest lag applies. Unannotated tables
    /// report nothing as provisional.
    pub fn provisional(&self, column: &str) -> Vec<bool> {
        let Some(cutoffs) = &self.cutoffs else {
            return vec![false; self.index.len()];
        };
        let application_type = (self.group_key == GroupKey::ApplicationType).then_some(column);
        self.index
            .iter()
            .map(|bucket| cutoffs.is_provisional(bucket.end(), application_type))
            .collect()
    }

    /// The table in long form: `(bucket, column, value)` triples.
    pub fn rows(&self) -> Vec<(TimeBucket, &str, f64)> {
        self.columns
            .iter()
            .zip(&self.values)
            .flat_map(|(column, values)| {
                self.index
                    .iter()
                    .zip(values)
                    .map(move |(bucket, value)| (*bucket, column.as_str(), *value))
            })
            .collect()
    }
}

fn bucket_of(record: &PatentRecord, granularity: TimeGranularity) -> Option<TimeBucket> {
    let temporal = record.temporal.as_ref()?;
    match granularity {
        TimeGranularity::Year => Some(TimeBucket::Year(temporal.year)),
        TimeGranularity::ArrivalMonth => Some(TimeBucket::Month(temporal.arrival_month)),
        TimeGranularity::PriorityMonth => temporal.priority_month.map(TimeBucket::Month),
    }
}

fn labels_of(
    record: &PatentRecord,
    group_key: GroupKey,
    facts: &HashMap<&str, Vec<&ClassificationFact>>,
) -> Vec<String> {
    let owned = || {
        facts
            .get(record.application_number.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    };
    match group_key {
        GroupKey::None => vec![TOTAL_COLUMN.to_string()],
        GroupKey::ApplicationType => vec![record.application_type.clone()],
        GroupKey::Firm => vec![record.firm.clone()],
        GroupKey::ClassificationClass => owned().iter().map(|f| f.class3.clone()).collect(),
        GroupKey::ClassificationSection => owned().iter().map(|f| f.section.clone()).collect(),
    }
}

/// Every bucket from the start of `first_year` to the end of `last_year`.
fn full_grid(granularity: TimeGranularity, first_year: i32, last_year: i32) -> Vec<TimeBucket> {
    match granularity {
        TimeGranularity::Year => (first_year..=last_year).map(TimeBucket::Year).collect(),
        TimeGranularity::ArrivalMonth | TimeGranularity::PriorityMonth => (first_year..=last_year)
            .flat_map(|y| (1..=12).filter_map(move |m| NaiveDate::from_ymd_opt(y, m, 1)))
            .map(TimeBucket::Month)
            .collect(),
    }
}

/// Counts `records` per (time bucket, group) and optionally applies a rolling window.
///
/// Only temporally eligible records inside the year selection are counted.
/// The selection is matched against the year of the record's bucket, so with
/// [`TimeGranularity::PriorityMonth`] it selects by priority year.
/// With `request.rolling` set, the counts are reindexed onto a complete grid
/// spanning the minimum to maximum selected year (or observed year when no
/// selection is given), so inactive periods appear as explicit zeros; buckets
/// falling outside that grid are dropped. Returns an empty table when nothing
/// is left to count.
pub fn aggregate(
    dataset: &Dataset,
    records: &[&PatentRecord],
    request: &AggregateRequest,
) -> TimeSeriesTable {
    let selection: Option<HashSet<i32>> = request
        .years
        .as_ref()
        .map(|years| years.iter().copied().collect());
    if selection.as_ref().is_some_and(|years| years.is_empty()) {
        return TimeSeriesTable::empty(request.group_key);
    }

    // Selection, buckets and grid all read the date the granularity places on
    // the time axis.
    let in_scope: Vec<&PatentRecord> = records
        .iter()
        .copied()
        .filter(|r| {
            let year = bucket_of(r, request.granularity).map(|b| b.year());
            match (year, &selection) {
                (Some(year), Some(years)) => years.contains(&year),
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
        .collect();

    let mut facts_by_owner: HashMap<&str, Vec<&ClassificationFact>> = HashMap::new();
    if request.group_key.counts_facts() {
        for fact in dataset.facts_for(&in_scope) {
            facts_by_owner
                .entry(fact.application_number.as_str())
                .or_default()
                .push(fact);
        }
    }

    let mut counts: BTreeMap<String, BTreeMap<TimeBucket, f64>> = BTreeMap::new();
    let mut observed: BTreeSet<TimeBucket> = BTreeSet::new();
    for record in &in_scope {
        let Some(bucket) = bucket_of(record, request.granularity) else {
            continue;
        };
        for label in labels_of(record, request.group_key, &facts_by_owner) {
            *counts.entry(label).or_default().entry(bucket).or_default() += 1.0;
            observed.insert(bucket);
        }
    }

    if counts.is_empty() {
        debug!("Aggregation over {} records produced no counts.", records.len());
        return TimeSeriesTable::empty(request.group_key);
    }

    let index: Vec<TimeBucket> = match request.rolling {
        Some(_) => {
            let span = match &selection {
                Some(years) => years
                    .iter()
                    .min()
                    .zip(years.iter().max())
                    .map(|(a, b)| (*a, *b)),
                None => observed.first().zip(observed.last()).map(|(a, b)| (a.year(), b.year())),
            };
            match span {
                Some((first, last)) => full_grid(request.granularity, first, last),
                None => Vec::new(),
            }
        }
        None => observed.into_iter().collect(),
    };

    let columns: Vec<String> = counts.keys().cloned().collect();
    let values: Vec<Vec<f64>> = counts
        .values()
        .map(|series| {
            let aligned: Vec<f64> = index
                .iter()
                .map(|b| series.get(b).copied().unwrap_or(0.0))
                .collect();
            match request.rolling {
                Some(window) => rolling(&aligned, window),
                None => aligned,
            }
        })
        .collect();

    debug!(
        "Aggregated {} records into {} buckets x {} columns.",
        in_scope.len(),
        index.len(),
        columns.len()
    );

    TimeSeriesTable {
        group_key: request.group_key,
        index,
        columns,
        values,
        markers: Vec::new(),
        cutoffs: None,
    }
}
