//! # Test Fixtures
//!
//! Builders for patent exports in the two-tier-header layout (column names,
//! then one category token per column, then data rows), plus a temp-dir
//! helper for tests that need the export on disk.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// The standard export columns and their category tokens, in header order.
pub const STANDARD_COLUMNS: [(&str, &str); 9] = [
    ("Application Number", "Raw"),
    ("Title in English", "Raw"),
    ("Abstract in English", "Raw"),
    ("Application Date", "Raw"),
    ("Earliest Priority Date", "Raw"),
    ("Data of Agent - Name in English", "Raw"),
    ("Application Type (ID)", "Raw"),
    ("Classification", "Enriched"),
    ("Data of Applicant - Legal Name in English", "Enriched"),
];

/// One record of the standard layout. Unset fields are written as empty cells.
#[derive(Debug, Clone, Default)]
pub struct PatentRow {
    pub application_number: String,
    pub title: String,
    pub abstract_text: String,
    pub application_date: String,
    pub priority_date: String,
    pub agent: String,
    pub application_type: String,
    pub classification: String,
    pub applicant: String,
}

impl PatentRow {
    pub fn new(application_number: &str) -> Self {
        Self {
            application_number: application_number.to_string(),
            ..Default::default()
        }
    }

    pub fn dates(mut self, application: &str, priority: &str) -> Self {
        self.application_date = application.to_string();
        self.priority_date = priority.to_string();
        self
    }

    pub fn agent(mut self, agent: &str) -> Self {
        self.agent = agent.to_string();
        self
    }

    pub fn kind(mut self, application_type: &str) -> Self {
        self.application_type = application_type.to_string();
        self
    }

    pub fn classification(mut self, codes: &str) -> Self {
        self.classification = codes.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn abstract_text(mut self, text: &str) -> Self {
        self.abstract_text = text.to_string();
        self
    }

    pub fn applicant(mut self, applicant: &str) -> Self {
        self.applicant = applicant.to_string();
        self
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.application_number.clone(),
            self.title.clone(),
            self.abstract_text.clone(),
            self.application_date.clone(),
            self.priority_date.clone(),
            self.agent.clone(),
            self.application_type.clone(),
            self.classification.clone(),
            self.applicant.clone(),
        ]
    }
}

/// Builds the CSV text of an export.
#[derive(Debug, Clone, Default)]
pub struct ExportBuilder {
    columns: Vec<(String, String)>,
    rows: Vec<Vec<String>>,
}

impl ExportBuilder {
    /// A builder with no columns, for hand-made layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with the [`STANDARD_COLUMNS`].
    pub fn standard() -> Self {
        Self {
            columns: STANDARD_COLUMNS
                .iter()
                .map(|(name, category)| (name.to_string(), category.to_string()))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a column. Rows shorter than the header read back as missing cells.
    pub fn column(mut self, name: &str, category: &str) -> Self {
        self.columns.push((name.to_string(), category.to_string()));
        self
    }

    /// Appends a standard record, followed by `extras` for any added columns.
    pub fn patent(mut self, row: PatentRow, extras: &[&str]) -> Self {
        let mut cells = row.cells();
        cells.extend(extras.iter().map(|e| e.to_string()));
        self.rows.push(cells);
        self
    }

    /// Appends cells verbatim, even if their count does not match the header.
    pub fn raw(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(|(name, _)| name))?;
        writer.write_record(self.columns.iter().map(|(_, category)| category))?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|_| anyhow!("failed to flush the CSV writer"))?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// A scratch directory that is removed when dropped.
pub struct TestSetup {
    pub dir: TempDir,
}

impl TestSetup {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    /// Writes `content` to `file_name` inside the directory.
    pub fn write(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Writes the export built by `builder` to `file_name`.
    pub fn write_export(&self, file_name: &str, builder: &ExportBuilder) -> Result<PathBuf> {
        self.write(file_name, &builder.to_csv()?)
    }
}
