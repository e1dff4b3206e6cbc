#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the integration tests: tracing initialisation and helpers
//! that turn fixture builders into loaded datasets.

use patscope::{Dataset, EngineConfig, PatentRecord};
use patscope_test_utils::{ExportBuilder, PatentRow};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Loads `builder`'s export with `config`.
pub fn load(builder: &ExportBuilder, config: &EngineConfig) -> Dataset {
    setup_tracing();
    let csv = builder.to_csv().expect("fixture should serialize");
    Dataset::try_from_reader(csv.as_bytes(), config).expect("fixture should load")
}

/// Loads `builder`'s export with the default configuration.
pub fn load_default(builder: &ExportBuilder) -> Dataset {
    load(builder, &EngineConfig::default())
}

/// Sorted application numbers of `records`.
pub fn numbers(records: &[&PatentRecord]) -> Vec<String> {
    let mut out: Vec<String> = records
        .iter()
        .map(|r| r.application_number.clone())
        .collect();
    out.sort();
    out
}

/// The two-record export used throughout the scenario tests.
pub fn two_record_export() -> ExportBuilder {
    ExportBuilder::standard()
        .patent(
            PatentRow::new("A1")
                .dates("2020-03-15", "2019-03-15")
                .agent("Acme IP")
                .kind("4")
                .classification("G06F 1/00, H04L 9/00")
                .title("Secure compute module"),
            &[],
        )
        .patent(
            PatentRow::new("A2")
                .dates("2021-07-01", "2020-07-01")
                .agent("-")
                .kind("1")
                .classification("-")
                .title("Garden hose coupling"),
            &[],
        )
}

/// Three records with known substrings for boolean grammar tests.
///
/// - `R1`: "ai" and "hydrogen", plus "battery".
/// - `R2`: "battery" only.
/// - `R3`: none of the three.
pub fn grammar_export() -> ExportBuilder {
    ExportBuilder::standard()
        .patent(
            PatentRow::new("R1")
                .dates("2020-01-10", "2019-01-10")
                .title("AI controlled hydrogen cell")
                .abstract_text("Includes a backup battery."),
            &[],
        )
        .patent(
            PatentRow::new("R2")
                .dates("2020-02-10", "2019-02-10")
                .title("Lithium battery pack")
                .abstract_text("High density storage."),
            &[],
        )
        .patent(
            PatentRow::new("R3")
                .dates("2020-03-10", "2019-03-10")
                .title("Wind turbine blade")
                .abstract_text("Composite structure."),
            &[],
        )
}
