//! Publication-lag visibility cutoffs.
//!
//! Applications stay unpublished for a statutory period after filing (18 or 30
//! months depending on the application type), so the most recent stretch of
//! any time series is known to be incomplete. The cutoffs computed here mark
//! where that stretch begins. They annotate a series; they never filter it.

use crate::config::LagConfig;
use crate::constants::{LONG_LAG_MONTHS, SHORT_LAG_MONTHS};
use chrono::{Local, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// `now` minus `months`, clamping the day to the end of the target month.
pub fn months_before(now: NaiveDateTime, months: u32) -> NaiveDateTime {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDateTime::MIN)
}

/// The 18- and 30-month cutoffs relative to `now`.
pub fn lag_cutoffs(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    (
        months_before(now, SHORT_LAG_MONTHS),
        months_before(now, LONG_LAG_MONTHS),
    )
}

/// A vertical marker a chart can draw at a cutoff date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutoffMarker {
    pub label: String,
    pub date: NaiveDate,
    pub months: u32,
    pub application_types: Vec<String>,
}

/// Cutoffs for both lag groups, computed once per interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagCutoffs {
    pub now: NaiveDateTime,
    pub short: NaiveDateTime,
    pub long: NaiveDateTime,
    pub policy: LagConfig,
}

impl LagCutoffs {
    pub fn compute(now: NaiveDateTime, policy: &LagConfig) -> Self {
        Self {
            now,
            short: months_before(now, policy.short_months),
            long: months_before(now, policy.long_months),
            policy: policy.clone(),
        }
    }

    /// Cutoffs relative to the local wall clock.
    pub fn from_local_now(policy: &LagConfig) -> Self {
        Self::compute(Local::now().naive_local(), policy)
    }

    /// The cutoff that applies to `application_type`.
    ///
    /// Types outside both lag groups, and `None`, get the longer lag.
    pub fn cutoff_for(&self, application_type: Option<&str>) -> NaiveDateTime {
        match application_type {
            Some(t) if self.policy.short_types.iter().any(|s| s == t) => self.short,
            _ => self.long,
        }
    }

    /// Whether data dated `date` is still provisionally incomplete.
    pub fn is_provisional(&self, date: NaiveDate, application_type: Option<&str>) -> bool {
        date > self.cutoff_for(application_type).date()
    }

    /// One marker per lag group, shortest lag first.
    pub fn markers(&self) -> Vec<CutoffMarker> {
        vec![
            CutoffMarker {
                label: format!("{}m Lag", self.policy.short_months),
                date: self.short.date(),
                months: self.policy.short_months,
                application_types: self.policy.short_types.clone(),
            },
            CutoffMarker {
                label: format!("{}m Lag", self.policy.long_months),
                date: self.long.date(),
                months: self.policy.long_months,
                application_types: self.policy.long_types.clone(),
            },
        ]
    }
}
