use std::io::{self, Write};

use tracing::{error, info};

use crate::{
    BenchError,
    aggregate::Aggregator,
    backend::ProfiledBackend,
    query::Query,
    report::Reporter,
    retry::RetryPolicy,
    sample::Sample,
    trial::TrialExecutor,
};

/// Outcome of a full run over every configured query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Benchmarks a list of queries against one backend, strictly sequentially.
pub struct Benchmarks<B> {
    aggregator: Aggregator<TrialExecutor<B>>,
    trials: u32,
    queries: Vec<Query>,
}

impl<B> Benchmarks<B>
where
    B: ProfiledBackend,
{
    pub fn new(backend: B, trials: u32, queries: Vec<Query>, retry: RetryPolicy) -> Self {
        Self {
            aggregator: Aggregator::new(TrialExecutor::new(backend), retry),
            trials,
            queries,
        }
    }

    pub fn backend(&self) -> &B {
        self.aggregator.runner().backend()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// One aggregated sample per optimizer version of `query`, in configured order.
    pub fn run_benchmark(&self, query: &Query, trials: u32) -> Result<Vec<Sample>, BenchError> {
        query.validate()?;
        let mut samples = Vec::with_capacity(query.optimizers.len());
        for optimizer in &query.optimizers {
            samples.push(self.aggregator.aggregate(optimizer, &query.sql, trials)?);
        }
        Ok(samples)
    }

    /// Runs every query and writes its report. A failing query is reported
    /// and skipped; the run continues with the next one.
    pub fn start<W: Write>(&self, reporter: &Reporter, out: &mut W) -> io::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for query in &self.queries {
            info!(
                query = %query.name,
                optimizers = query.optimizers.len(),
                trials = self.trials,
                "benchmarking"
            );
            match self.run_benchmark(query, self.trials) {
                Ok(samples) => {
                    reporter.write_query(out, &query.name, &samples)?;
                    summary.completed += 1;
                }
                Err(err) => {
                    error!(query = %query.name, error = %err, "query abandoned");
                    reporter.write_failure(out, &query.name, &err.to_string())?;
                    summary.failed.push(query.name.clone());
                }
            }
        }
        Ok(summary)
    }
}
