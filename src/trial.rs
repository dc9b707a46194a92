use tracing::debug;

use crate::{BenchError, backend::ProfiledBackend, sample::Sample};

/// Runs one trial of a statement under a fixed optimizer version.
pub trait TrialRunner {
    fn run_trial(&self, optimizer: &str, statement: &str) -> Result<Sample, BenchError>;
}

impl<F> TrialRunner for F
where
    F: Fn(&str, &str) -> Result<Sample, BenchError>,
{
    fn run_trial(&self, optimizer: &str, statement: &str) -> Result<Sample, BenchError> {
        self(optimizer, statement)
    }
}

/// Executes single profiled trials against a [`ProfiledBackend`].
///
/// Errors are returned as-is; the caller decides whether to retry.
pub struct TrialExecutor<B> {
    backend: B,
}

impl<B> TrialExecutor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B> TrialExecutor<B>
where
    B: ProfiledBackend,
{
    pub fn execute(&self, optimizer: &str, statement: &str) -> Result<Sample, BenchError> {
        let mut stream = self.backend.execute_profiled(statement, optimizer)?;
        let mut drained = 0u64;
        while stream.next_row()?.is_some() {
            drained += 1;
        }
        let profile = stream.query_stats().ok_or_else(|| {
            BenchError::stream(format!(
                "no profiling counters after draining {drained} rows"
            ))
        })?;
        let sample = Sample::from_profile(optimizer, profile);
        debug!(
            optimizer,
            rows = drained,
            elapsed = ?sample.elapsed_time,
            "trial complete"
        );
        Ok(sample)
    }
}

impl<B> TrialRunner for TrialExecutor<B>
where
    B: ProfiledBackend,
{
    fn run_trial(&self, optimizer: &str, statement: &str) -> Result<Sample, BenchError> {
        self.execute(optimizer, statement)
    }
}
