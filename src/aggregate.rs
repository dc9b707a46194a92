use std::{thread, time::Duration};

use tracing::{info, warn};

use crate::{BenchError, retry::RetryPolicy, sample::Sample, trial::TrialRunner};

/// Running sums over successful trials.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Totals {
    trials: u32,
    rows_scanned: u64,
    rows_returned: u64,
    elapsed_time: Duration,
    cpu_time: Duration,
    query_plan_time: Duration,
}

impl Totals {
    fn add(&mut self, sample: &Sample) {
        self.trials += 1;
        self.rows_scanned = self.rows_scanned.saturating_add(sample.rows_scanned);
        self.rows_returned = self.rows_returned.saturating_add(sample.rows_returned);
        self.elapsed_time = self.elapsed_time.saturating_add(sample.elapsed_time);
        self.cpu_time = self.cpu_time.saturating_add(sample.cpu_time);
        self.query_plan_time = self.query_plan_time.saturating_add(sample.query_plan_time);
    }

    /// Arithmetic mean of the accumulated trials, zero when none were recorded.
    fn mean(&self, optimizer: &str) -> Sample {
        if self.trials == 0 {
            return Sample::zero(optimizer);
        }
        let n = self.trials;
        Sample {
            optimizer: optimizer.to_string(),
            rows_scanned: self.rows_scanned / u64::from(n),
            rows_returned: self.rows_returned / u64::from(n),
            elapsed_time: self.elapsed_time / n,
            cpu_time: self.cpu_time / n,
            query_plan_time: self.query_plan_time / n,
        }
    }
}

/// Repeats trials until enough of them succeed and reduces them to their mean.
pub struct Aggregator<R> {
    runner: R,
    retry: RetryPolicy,
}

impl<R> Aggregator<R>
where
    R: TrialRunner,
{
    pub fn new(runner: R, retry: RetryPolicy) -> Self {
        Self { runner, retry }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Mean of `trials` successful trials of `statement` under `optimizer`.
    ///
    /// Failed trials are discarded and do not count toward `trials`. A
    /// non-retryable error aborts at once; retryable ones are attempted again
    /// until the retry policy gives up. `trials == 0` yields a zero sample.
    pub fn aggregate(
        &self,
        optimizer: &str,
        statement: &str,
        trials: u32,
    ) -> Result<Sample, BenchError> {
        let mut totals = Totals::default();
        let mut failures = 0u32;
        while totals.trials < trials {
            match self.runner.run_trial(optimizer, statement) {
                Ok(sample) => totals.add(&sample),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    failures = failures.saturating_add(1);
                    warn!(optimizer, failures, error = %err, "discarding failed trial");
                    if !self.retry.allows(failures) {
                        return Err(BenchError::RetriesExhausted {
                            optimizer: optimizer.to_string(),
                            failures,
                            last_error: err.to_string(),
                        });
                    }
                    let wait = self.retry.backoff(failures);
                    if !wait.is_zero() {
                        thread::sleep(wait);
                    }
                }
            }
        }
        let sample = totals.mean(optimizer);
        info!(
            optimizer,
            trials,
            failures,
            rows_scanned = sample.rows_scanned,
            elapsed = ?sample.elapsed_time,
            "aggregated sample"
        );
        Ok(sample)
    }
}
