//! Line-oriented rendering of benchmark results.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use crate::{
    compare::{Highlight, MetricDelta, SampleDiff, compare_consecutive, format_percentage},
    sample::{Sample, SampleRecord},
};

const COLUMN: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown format {other}, expected text or json")),
        }
    }
}

/// Right-aligns `value` to `col` characters. Longer values are returned unchanged.
pub fn pad(value: &str, col: usize) -> String {
    let len = value.chars().count();
    if len >= col {
        return value.to_string();
    }
    format!("{}{value}", " ".repeat(col - len))
}

#[derive(Debug, Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    samples: Vec<SampleRecord>,
    diffs: Vec<SampleDiff>,
}

#[derive(Debug, Serialize)]
struct FailedQuery<'a> {
    query: &'a str,
    error: &'a str,
}

/// Writes query results to an output sink.
#[derive(Clone, Copy, Debug)]
pub struct Reporter {
    format: ReportFormat,
    color: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn header() -> String {
        format!(
            "   {:>10} {:>10} {:>10} {:>10} ",
            "(scanned)", "(total)", "(cpu)", "(plan)"
        )
    }

    /// Deltas of `diff` padded into report columns, flagged by sign when color is on.
    pub fn diff_line(&self, diff: &SampleDiff) -> String {
        let cells: Vec<String> = diff
            .deltas()
            .into_iter()
            .map(|delta| self.delta_cell(delta))
            .collect();
        format!("{}  {}", pad("", diff.optimizer.len()), cells.join(" "))
    }

    fn delta_cell(&self, delta: MetricDelta) -> String {
        let text = pad(&format_percentage(delta), COLUMN);
        if !self.color {
            return text;
        }
        match delta.highlight() {
            Highlight::Regression => text.red().to_string(),
            Highlight::Improvement => text.green().to_string(),
            Highlight::Unchanged => text,
        }
    }

    pub fn write_query<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        samples: &[Sample],
    ) -> io::Result<()> {
        let diffs = compare_consecutive(samples);
        match self.format {
            ReportFormat::Text => {
                writeln!(out, "{name}")?;
                writeln!(out, "{}", Self::header())?;
                for (idx, sample) in samples.iter().enumerate() {
                    writeln!(out, "{sample}")?;
                    if idx > 0 {
                        writeln!(out, "{}", self.diff_line(&diffs[idx - 1]))?;
                    }
                }
            }
            ReportFormat::Json => {
                let report = QueryReport {
                    query: name,
                    samples: samples.iter().map(Sample::record).collect(),
                    diffs,
                };
                let line = serde_json::to_string(&report).map_err(io::Error::other)?;
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }

    pub fn write_failure<W: Write>(&self, out: &mut W, name: &str, error: &str) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => {
                let line = format!("{name}: FAILED ({error})");
                if self.color {
                    writeln!(out, "{}", line.red())
                } else {
                    writeln!(out, "{line}")
                }
            }
            ReportFormat::Json => {
                let line = serde_json::to_string(&FailedQuery { query: name, error })
                    .map_err(io::Error::other)?;
                writeln!(out, "{line}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_right_aligns() {
        assert_eq!(pad("5%", 4), "  5%");
        assert_eq!(pad("+120.00%", 4), "+120.00%");
    }

    #[test]
    fn test_header_columns() {
        assert_eq!(
            Reporter::header(),
            "    (scanned)    (total)      (cpu)     (plan) "
        );
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!(ReportFormat::parse("json"), Ok(ReportFormat::Json));
        assert!(ReportFormat::parse("xml").is_err());
    }

    #[test]
    fn test_colored_cells_follow_highlight() {
        colored::control::set_override(true);
        let reporter = Reporter::new(ReportFormat::Text, true);
        let diff = SampleDiff {
            optimizer: "latest".into(),
            baseline: "1".into(),
            rows_scanned: MetricDelta::Change(20.0),
            elapsed_time: MetricDelta::Change(-50.0),
            cpu_time: MetricDelta::NotApplicable,
            query_plan_time: MetricDelta::Change(0.0),
        };
        let line = reporter.diff_line(&diff);
        assert!(line.contains("\x1b[31m   +20.00%\x1b[0m"), "{line:?}");
        assert!(line.contains("\x1b[32m   -50.00%\x1b[0m"), "{line:?}");
        assert!(line.contains("       n/a      0.00%"), "{line:?}");
        assert!(line.ends_with("     0.00%"), "{line:?}");
    }
}
