//! # Shared Constants
//!
//! This module provides a centralized location for the column names, sentinel
//! tokens and analytics defaults used across the `patscope` crate. Using these
//! constants helps to avoid "magic strings" and ensures consistency.

/// The default path of the patent export loaded when no path is configured.
pub const DEFAULT_SOURCE_PATH: &str = "data/patents.csv";

/// The default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "patscope.yml";

/// Prefix for environment variable overrides (e.g. `PATSCOPE_ROLLING__WINDOW`).
pub const ENV_PREFIX: &str = "PATSCOPE";

// --- Default column names of the export ---

pub const COL_APPLICATION_NUMBER: &str = "Application Number";
pub const COL_APPLICATION_DATE: &str = "Application Date";
pub const COL_PRIORITY_DATE: &str = "Earliest Priority Date";
pub const COL_AGENT_NAME: &str = "Data of Agent - Name in English";
pub const COL_APPLICATION_TYPE: &str = "Application Type (ID)";
pub const COL_CLASSIFICATION: &str = "Classification";
pub const COL_TITLE: &str = "Title in English";
pub const COL_ABSTRACT: &str = "Abstract in English";
pub const COL_APPLICANT: &str = "Data of Applicant - Legal Name in English";

/// Canonical firm identity for applications filed without an agent.
pub const DIRECT_FILING: &str = "DIRECT FILING";

/// Cell values treated as "not supplied" in agent and type columns.
pub const PLACEHOLDER_TOKENS: [&str; 5] = ["", "-", "NAN", "NONE", "N/A"];

/// Upper-cased classification tokens that never produce a fact row.
pub const INVALID_CLASSIFICATIONS: [&str; 5] = ["NO CLASSIFICATION", "NAN", "NONE", "-", ""];

/// Column name used when aggregating without a grouping key.
pub const TOTAL_COLUMN: &str = "ALL";

/// Default trailing window, in periods, for rolling aggregation.
pub const DEFAULT_ROLLING_WINDOW: usize = 12;

/// Statutory publication delay for the short-lag application types.
pub const SHORT_LAG_MONTHS: u32 = 18;

/// Statutory publication delay for the long-lag application types.
pub const LONG_LAG_MONTHS: u32 = 30;

/// Date formats tried, in order, after RFC 3339.
pub const DEFAULT_DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y",
    "%Y%m%d",
    "%d-%b-%Y",
];
