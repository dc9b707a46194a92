use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// One measurement of a statement under a single optimizer version.
///
/// Either the counters of one trial or the mean over several trials. Counts
/// and durations start at zero and are only ever summed and divided, so no
/// field can go negative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub optimizer: String,
    pub rows_scanned: u64,
    pub rows_returned: u64,
    pub elapsed_time: Duration,
    pub cpu_time: Duration,
    pub query_plan_time: Duration,
}

impl Sample {
    pub fn zero<T: Into<String>>(optimizer: T) -> Self {
        Self {
            optimizer: optimizer.into(),
            ..Self::default()
        }
    }

    /// "scanned/returned" ratio string shown at the end of a report line.
    pub fn scan_ratio(&self) -> String {
        format!("{}/{}", self.rows_scanned, self.rows_returned)
    }

    pub fn record(&self) -> SampleRecord {
        SampleRecord {
            optimizer: self.optimizer.clone(),
            rows_scanned: self.rows_scanned,
            rows_returned: self.rows_returned,
            elapsed_ms: as_millis_f64(self.elapsed_time),
            cpu_ms: as_millis_f64(self.cpu_time),
            query_plan_ms: as_millis_f64(self.query_plan_time),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:>10} {:>10} {:>10} {:>10}    {}",
            self.optimizer,
            self.rows_scanned,
            format_duration(self.elapsed_time),
            format_duration(self.cpu_time),
            format_duration(self.query_plan_time),
            self.scan_ratio()
        )
    }
}

/// Serializable view of a [`Sample`] with durations in fractional milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleRecord {
    pub optimizer: String,
    pub rows_scanned: u64,
    pub rows_returned: u64,
    pub elapsed_ms: f64,
    pub cpu_ms: f64,
    pub query_plan_ms: f64,
}

pub fn format_duration(duration: Duration) -> String {
    format!("{duration:?}")
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_fixed_width_columns() {
        let sample = Sample {
            optimizer: "latest".into(),
            rows_scanned: 120,
            rows_returned: 4,
            elapsed_time: Duration::from_millis(15),
            cpu_time: Duration::from_micros(1500),
            query_plan_time: Duration::from_millis(2),
        };
        assert_eq!(
            sample.to_string(),
            "latest:        120       15ms      1.5ms        2ms    120/4"
        );
    }

    #[test]
    fn test_record_converts_durations_to_millis() {
        let sample = Sample {
            elapsed_time: Duration::from_micros(2500),
            ..Sample::zero("1")
        };
        let record = sample.record();
        assert_eq!(record.optimizer, "1");
        assert!((record.elapsed_ms - 2.5).abs() < 1e-9);
        assert_eq!(record.cpu_ms, 0.0);
    }
}
