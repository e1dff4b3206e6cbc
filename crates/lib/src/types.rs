use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single cell of the export.
///
/// `Missing` marks a cell the source did not supply at all, which is kept
/// distinct from a literal placeholder such as `"-"` written into the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Present(String),
    Missing,
}

impl FieldValue {
    /// Builds a value from a raw cell. Cells that are empty after trimming are `Missing`.
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::Present(cell.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Present(s) => Some(s),
            FieldValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Present(s) => f.write_str(s),
            FieldValue::Missing => Ok(()),
        }
    }
}

/// The category token carried by the second header row of the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FieldCategory {
    /// Copied verbatim from the patent office source.
    Raw,
    /// Derived or augmented by the data provider.
    Enriched,
    /// Any other token, kept as written (after trimming).
    Other(String),
}

impl FieldCategory {
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("raw") {
            FieldCategory::Raw
        } else if token.eq_ignore_ascii_case("enriched") {
            FieldCategory::Enriched
        } else {
            FieldCategory::Other(token.to_string())
        }
    }
}

/// The two-tier header of a loaded export: ordered column names plus the
/// category of each column. Built once at load time and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    categories: Vec<FieldCategory>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// Pairs each column with its category. Missing category tokens become
    /// `Other("")`. For duplicate column names the first position wins.
    pub fn new(columns: Vec<String>, category_tokens: &[String]) -> Self {
        let categories = (0..columns.len())
            .map(|i| {
                category_tokens
                    .get(i)
                    .map(|t| FieldCategory::from_token(t))
                    .unwrap_or_else(|| FieldCategory::Other(String::new()))
            })
            .collect();
        let mut positions = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self {
            columns,
            categories,
            positions,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn category_of(&self, column: &str) -> Option<&FieldCategory> {
        self.index_of(column).map(|i| &self.categories[i])
    }

    /// Column names of one category, in header order.
    pub fn columns_in(&self, category: &FieldCategory) -> Vec<&str> {
        self.columns
            .iter()
            .zip(&self.categories)
            .filter(|(_, c)| *c == category)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The column -> category mapping as a map, for callers that want lookups by name.
    pub fn category_map(&self) -> HashMap<&str, &FieldCategory> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(&self.categories)
            .collect()
    }
}

/// Calendar fields derived from a record's parsed dates.
///
/// Present only on records that satisfy the configured temporal eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalFields {
    /// Calendar year of the application date.
    pub year: i32,
    /// English month name of the application date, e.g. "March".
    pub month_name: &'static str,
    /// First day of the application date's month.
    pub arrival_month: NaiveDate,
    /// First day of the priority date's month, when that date parsed.
    pub priority_month: Option<NaiveDate>,
}

/// One normalized patent application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatentRecord {
    pub application_number: String,
    /// Raw cell values, aligned with the dataset's [`Schema`] columns.
    pub fields: Vec<FieldValue>,
    pub application_date: Option<NaiveDate>,
    pub priority_date: Option<NaiveDate>,
    /// Normalized agent identity (trimmed, upper-cased, or `DIRECT FILING`).
    pub firm: String,
    /// Trimmed application type code, `"-"` when not supplied.
    pub application_type: String,
    pub temporal: Option<TemporalFields>,
    #[serde(skip)]
    pub(crate) haystack: String,
}

impl PatentRecord {
    /// Whether the record takes part in temporal analytics.
    pub fn is_temporal(&self) -> bool {
        self.temporal.is_some()
    }

    pub fn year(&self) -> Option<i32> {
        self.temporal.as_ref().map(|t| t.year)
    }

    /// The lower-cased concatenation of every raw field, used by boolean search.
    pub fn haystack(&self) -> &str {
        &self.haystack
    }
}

/// One (record, classification code) pair of the exploded fact table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassificationFact {
    /// Back-reference to the owning record.
    pub application_number: String,
    /// Cleaned code: trimmed and upper-cased.
    pub code: String,
    /// First character of the code.
    pub section: String,
    /// First three characters of the code.
    pub class3: String,
}
