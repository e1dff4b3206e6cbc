//! Trailing-window statistics over a gap-free series.

use crate::constants::DEFAULT_ROLLING_WINDOW;
use serde::{Deserialize, Serialize};

/// The statistic computed over each trailing window.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RollingStat {
    #[default]
    Sum,
    Mean,
}

/// A trailing window of `size` periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollingWindow {
    pub size: usize,
    pub stat: RollingStat,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self {
            size: DEFAULT_ROLLING_WINDOW,
            stat: RollingStat::Sum,
        }
    }
}

/// Applies a trailing window to `values`.
///
/// The window shrinks at the start of the series (minimum one period), so the
/// output has the same length as the input and no undefined entries. A mean
/// divides by the number of periods actually in the window. A `size` of zero
/// is treated as one.
pub fn rolling(values: &[f64], window: RollingWindow) -> Vec<f64> {
    let size = window.size.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, value) in values.iter().enumerate() {
        running += value;
        if i >= size {
            running -= values[i - size];
        }
        let periods = (i + 1).min(size);
        out.push(match window.stat {
            RollingStat::Sum => running,
            RollingStat::Mean => running / periods as f64,
        });
    }
    out
}
