//! Percentage deltas between consecutive samples of one query.
//!
//! A delta is `(current - previous) / previous * 100`: an increase (regression)
//! is positive, a decrease (improvement) negative. A zero previous value has
//! no defined delta and yields [`MetricDelta::NotApplicable`].

use std::time::Duration;

use serde::Serialize;

use crate::sample::Sample;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "percent")]
pub enum MetricDelta {
    Change(f64),
    NotApplicable,
}

/// How a delta should be flagged when displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Regression,
    Improvement,
    Unchanged,
}

impl MetricDelta {
    pub fn between(previous: f64, current: f64) -> Self {
        if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
            return MetricDelta::NotApplicable;
        }
        MetricDelta::Change((previous - current) / previous * -100.0)
    }

    pub fn of_counts(previous: u64, current: u64) -> Self {
        Self::between(previous as f64, current as f64)
    }

    pub fn of_durations(previous: Duration, current: Duration) -> Self {
        Self::between(previous.as_secs_f64(), current.as_secs_f64())
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            MetricDelta::Change(v) => Some(*v),
            MetricDelta::NotApplicable => None,
        }
    }

    pub fn highlight(&self) -> Highlight {
        match self {
            MetricDelta::Change(v) if *v > 0.0 => Highlight::Regression,
            MetricDelta::Change(v) if *v < 0.0 => Highlight::Improvement,
            _ => Highlight::Unchanged,
        }
    }
}

/// Signed two-decimal percentage text, e.g. `+20.00%`, `-20.00%`, `0.00%`, `n/a`.
pub fn format_percentage(delta: MetricDelta) -> String {
    match delta {
        MetricDelta::NotApplicable => "n/a".to_string(),
        MetricDelta::Change(v) if v == 0.0 => "0.00%".to_string(),
        MetricDelta::Change(v) => format!("{v:+.2}%"),
    }
}

/// Deltas of one sample relative to the sample before it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleDiff {
    pub optimizer: String,
    pub baseline: String,
    pub rows_scanned: MetricDelta,
    pub elapsed_time: MetricDelta,
    pub cpu_time: MetricDelta,
    pub query_plan_time: MetricDelta,
}

impl SampleDiff {
    pub fn between(previous: &Sample, current: &Sample) -> Self {
        Self {
            optimizer: current.optimizer.clone(),
            baseline: previous.optimizer.clone(),
            rows_scanned: MetricDelta::of_counts(previous.rows_scanned, current.rows_scanned),
            elapsed_time: MetricDelta::of_durations(previous.elapsed_time, current.elapsed_time),
            cpu_time: MetricDelta::of_durations(previous.cpu_time, current.cpu_time),
            query_plan_time: MetricDelta::of_durations(
                previous.query_plan_time,
                current.query_plan_time,
            ),
        }
    }

    /// Deltas in report column order: scanned, elapsed, cpu, plan.
    pub fn deltas(&self) -> [MetricDelta; 4] {
        [
            self.rows_scanned,
            self.elapsed_time,
            self.cpu_time,
            self.query_plan_time,
        ]
    }
}

/// One diff per sample after the first, each against its immediate predecessor.
pub fn compare_consecutive(samples: &[Sample]) -> Vec<SampleDiff> {
    samples
        .windows(2)
        .map(|pair| SampleDiff::between(&pair[0], &pair[1]))
        .collect()
}
