//! # Record Normalization Tests
//!
//! Date parsing, derived calendar fields, firm identity and the two temporal
//! eligibility modes.

mod common;

use chrono::{Datelike, NaiveDate};
use patscope::config::TemporalEligibility;
use patscope::constants::DIRECT_FILING;
use patscope::ingest::{month_name, normalize_firm, parse_date, RawTable};
use patscope::{Dataset, EngineConfig, FieldValue, Schema};
use patscope_test_utils::{ExportBuilder, PatentRow, STANDARD_COLUMNS};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn present(text: &str) -> FieldValue {
    FieldValue::Present(text.to_string())
}

/// The default format list accepts the layouts seen in exports.
#[test]
fn test_parse_date_accepts_common_layouts() {
    let formats = EngineConfig::default().date_formats;
    let cases = [
        ("2020-03-15", ymd(2020, 3, 15)),
        ("2020-03-15 08:30:00", ymd(2020, 3, 15)),
        ("2020-03-15T08:30:00Z", ymd(2020, 3, 15)),
        ("2020/03/15", ymd(2020, 3, 15)),
        ("03/15/2020", ymd(2020, 3, 15)),
        ("15.03.2020", ymd(2020, 3, 15)),
        ("15-Mar-2020", ymd(2020, 3, 15)),
        (" 2020-03-15 ", ymd(2020, 3, 15)),
    ];
    for (input, expected) in cases {
        assert_eq!(
            parse_date(&present(input), &formats),
            Some(expected),
            "failed to parse {input:?}"
        );
    }
}

/// Unparseable and absent values become `None` instead of failing.
#[test]
fn test_parse_date_rejects_garbage() {
    let formats = EngineConfig::default().date_formats;
    assert_eq!(parse_date(&present("not a date"), &formats), None);
    assert_eq!(parse_date(&present("2020-13-45"), &formats), None);
    assert_eq!(parse_date(&present("-"), &formats), None);
    assert_eq!(parse_date(&FieldValue::Missing, &formats), None);
}

#[test]
fn test_month_name_is_english() {
    assert_eq!(month_name(ymd(2021, 1, 31)), "January");
    assert_eq!(month_name(ymd(2021, 12, 1)), "December");
}

/// Agents are trimmed and upper-cased; placeholders collapse to direct filing.
#[test]
fn test_firm_normalization() {
    assert_eq!(normalize_firm(&present("  Acme ip  ")), "ACME IP");
    assert_eq!(normalize_firm(&present("-")), DIRECT_FILING);
    assert_eq!(normalize_firm(&present("nan")), DIRECT_FILING);
    assert_eq!(normalize_firm(&present("None")), DIRECT_FILING);
    assert_eq!(normalize_firm(&present("N/A")), DIRECT_FILING);
    assert_eq!(normalize_firm(&FieldValue::Missing), DIRECT_FILING);
}

/// Year and month name are recomputable from the record's own application date.
#[test]
fn test_derived_fields_follow_application_date() {
    // Arrange
    let dataset = common::load_default(&common::two_record_export());

    // Act & Assert
    for record in dataset.temporal_records() {
        let app = record.application_date.unwrap();
        let temporal = record.temporal.as_ref().unwrap();
        assert_eq!(temporal.year, app.year());
        assert_eq!(temporal.month_name, month_name(app));
        assert_eq!(temporal.arrival_month, ymd(app.year(), app.month(), 1));
    }
    let a1 = dataset.get("A1").unwrap();
    assert_eq!(a1.year(), Some(2020));
    assert_eq!(a1.temporal.as_ref().unwrap().month_name, "March");
    assert_eq!(
        a1.temporal.as_ref().unwrap().priority_month,
        Some(ymd(2019, 3, 1))
    );
}

fn mixed_dates_export() -> ExportBuilder {
    ExportBuilder::standard()
        .patent(PatentRow::new("BOTH").dates("2020-05-05", "2019-05-05"), &[])
        .patent(PatentRow::new("APP_ONLY").dates("2020-06-06", ""), &[])
        .patent(PatentRow::new("BAD_APP").dates("garbage", "2019-01-01"), &[])
        .patent(PatentRow::new("NEITHER").dates("", ""), &[])
}

/// By default only the application date decides temporal eligibility.
#[test]
fn test_application_date_only_eligibility() {
    // Arrange
    let dataset = common::load_default(&mixed_dates_export());

    // Act
    let eligible = common::numbers(&dataset.temporal_records());

    // Assert
    assert_eq!(dataset.len(), 4);
    assert_eq!(eligible, vec!["APP_ONLY", "BOTH"]);
    let app_only = dataset.get("APP_ONLY").unwrap();
    assert_eq!(app_only.temporal.as_ref().unwrap().priority_month, None);
}

/// The strict mode additionally requires a parseable priority date.
#[test]
fn test_application_and_priority_eligibility() {
    // Arrange
    let config = EngineConfig {
        eligibility: TemporalEligibility::ApplicationAndPriority,
        ..Default::default()
    };

    // Act
    let dataset = common::load(&mixed_dates_export(), &config);

    // Assert
    assert_eq!(dataset.len(), 4);
    assert_eq!(common::numbers(&dataset.temporal_records()), vec!["BOTH"]);
    assert_eq!(
        dataset.eligibility(),
        TemporalEligibility::ApplicationAndPriority
    );
}

/// Ineligible records stay searchable.
#[test]
fn test_undated_records_remain_searchable() {
    // Arrange
    let dataset = common::load_default(&mixed_dates_export());

    // Act
    let hits = dataset.search("neither", &Default::default());

    // Assert
    assert_eq!(hits.len(), 1);
    assert!(!hits[0].is_temporal());
}

/// Rows without an application number, and repeats of one, are dropped.
#[test]
fn test_unkeyed_and_duplicate_rows_are_dropped() {
    // Arrange
    let builder = ExportBuilder::standard()
        .patent(PatentRow::new("A1").title("first"), &[])
        .patent(PatentRow::new("").title("no key"), &[])
        .patent(PatentRow::new("-").title("placeholder key"), &[])
        .patent(PatentRow::new("A1").title("second"), &[]);

    // Act
    let dataset = common::load_default(&builder);

    // Assert
    assert_eq!(dataset.len(), 1);
    assert!(dataset.get("A1").unwrap().haystack().contains("first"));
}

/// A blank application type reads back as the placeholder code.
#[test]
fn test_missing_application_type_is_placeholder() {
    // Arrange
    let builder = ExportBuilder::standard()
        .patent(PatentRow::new("A1").kind(" 4 "), &[])
        .patent(PatentRow::new("A2"), &[]);

    // Act
    let dataset = common::load_default(&builder);

    // Assert
    assert_eq!(dataset.get("A1").unwrap().application_type, "4");
    assert_eq!(dataset.get("A2").unwrap().application_type, "-");
}

/// A caller-built row shorter than the schema reads its absent cells as missing.
#[test]
fn test_short_rows_in_a_raw_table_are_padded() {
    // Arrange
    let columns: Vec<String> = STANDARD_COLUMNS.iter().map(|(n, _)| n.to_string()).collect();
    let categories: Vec<String> = STANDARD_COLUMNS
        .iter()
        .map(|(_, c)| c.to_string())
        .collect();
    let table = RawTable {
        schema: Schema::new(columns, &categories),
        rows: vec![vec![present("A1")], Vec::new()],
    };

    // Act
    let dataset = Dataset::from_raw_table(table, &EngineConfig::default()).unwrap();

    // Assert
    assert_eq!(dataset.len(), 1);
    let record = dataset.get("A1").unwrap();
    assert_eq!(record.fields.len(), 9);
    assert!(!record.is_temporal());
    assert_eq!(record.firm, DIRECT_FILING);
    assert_eq!(record.application_type, "-");
    assert!(dataset.facts().is_empty());
}
