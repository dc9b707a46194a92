//! Profiling counters reported by a profiled execution, and their conversion
//! into the typed fields of a [`Sample`].
//!
//! Backends report every counter as a string. Counters outside
//! [`ProfileCounter`] are ignored, and a value that fails to parse reads as
//! zero. Zero substitution can understate a measurement; it never raises an
//! error.

use std::time::Duration;

use ahash::AHashMap;

use crate::sample::Sample;

/// Counter name to raw counter value, as returned by one profiled execution.
pub type RawProfile = AHashMap<String, String>;

/// Counters understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileCounter {
    RowsScanned,
    RowsReturned,
    QueryPlanCreationTime,
    CpuTime,
    ElapsedTime,
}

impl ProfileCounter {
    pub const ALL: [ProfileCounter; 5] = [
        ProfileCounter::RowsScanned,
        ProfileCounter::RowsReturned,
        ProfileCounter::QueryPlanCreationTime,
        ProfileCounter::CpuTime,
        ProfileCounter::ElapsedTime,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProfileCounter::RowsScanned => "rows_scanned",
            ProfileCounter::RowsReturned => "rows_returned",
            ProfileCounter::QueryPlanCreationTime => "query_plan_creation_time",
            ProfileCounter::CpuTime => "cpu_time",
            ProfileCounter::ElapsedTime => "elapsed_time",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|counter| counter.key() == key)
    }

    /// Writes the parsed `raw` value into the matching field of `sample`.
    fn apply(self, sample: &mut Sample, raw: &str) {
        match self {
            ProfileCounter::RowsScanned => sample.rows_scanned = parse_count(raw),
            ProfileCounter::RowsReturned => sample.rows_returned = parse_count(raw),
            ProfileCounter::QueryPlanCreationTime => sample.query_plan_time = parse_duration(raw),
            ProfileCounter::CpuTime => sample.cpu_time = parse_duration(raw),
            ProfileCounter::ElapsedTime => sample.elapsed_time = parse_duration(raw),
        }
    }
}

/// Parses a base-10 signed 64-bit counter. Unparseable or negative values read as zero.
pub fn parse_count(raw: &str) -> u64 {
    raw.parse::<i64>().map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Parses a `"<millis> <unit noise>"` duration counter such as `"1500 msecs"`.
///
/// Only the token before the first space is read, as fractional milliseconds.
/// Missing, unparseable and negative values read as zero, as do exponent
/// forms like `"1e3"`.
pub fn parse_duration(raw: &str) -> Duration {
    let token = raw.split(' ').next().unwrap_or("");
    if !is_decimal(token) {
        return Duration::ZERO;
    }
    let millis = match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => return Duration::ZERO,
    };
    let nanos = (millis * 1_000_000.0).round();
    if nanos >= u64::MAX as f64 {
        return Duration::ZERO;
    }
    Duration::from_nanos(nanos as u64)
}

/// Plain decimal text: optional sign, digits, at most one point. No exponent,
/// `inf` or `NaN`.
fn is_decimal(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    let mut points = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' => points += 1,
            _ => return false,
        }
    }
    seen_digit && points <= 1
}

impl Sample {
    /// Builds a sample for `optimizer` from the counters of one profiled execution.
    pub fn from_profile<T: Into<String>>(optimizer: T, profile: &RawProfile) -> Self {
        let mut sample = Sample::zero(optimizer);
        for (key, raw) in profile {
            if let Some(counter) = ProfileCounter::from_key(key) {
                counter.apply(&mut sample, raw);
            }
        }
        sample
    }
}
