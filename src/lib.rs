//! Query-optimizer benchmarking for SQL statements.
//!
//! Each configured statement is executed repeatedly under every optimizer
//! version it lists. The profiling counters of each trial are averaged into
//! one [`Sample`] per optimizer version, and every sample is compared with
//! the one before it as signed percentage deltas (positive means slower or
//! more rows scanned).
//!
//! ```no_run
//! use planbench::{Benchmarks, Query, RetryPolicy, SqliteBackend};
//!
//! let backend = SqliteBackend::in_memory()?;
//! backend.run_setup(&["CREATE TABLE t(a INTEGER)".to_string()])?;
//! let query = Query::new("scan", "SELECT * FROM t", &["1", "latest"]);
//! let bench = Benchmarks::new(backend, 5, vec![query.clone()], RetryPolicy::default());
//! let samples = bench.run_benchmark(&query, 5)?;
//! assert_eq!(samples.len(), 2);
//! # Ok::<(), planbench::BenchError>(())
//! ```

pub mod aggregate;
pub mod backend;
pub mod cli;
pub mod compare;
pub mod config;
pub mod counters;
pub mod errors;
pub mod logging;
pub mod query;
pub mod report;
pub mod retry;
pub mod runner;
pub mod sample;
#[cfg(feature = "sqlite-backend")]
pub mod sqlite_backend;
pub mod test_utils;
pub mod trial;

pub use crate::aggregate::Aggregator;
pub use crate::backend::{ProfiledBackend, ResultStream};
pub use crate::compare::{MetricDelta, SampleDiff};
pub use crate::config::BenchConfig;
pub use crate::counters::{ProfileCounter, RawProfile};
pub use crate::errors::BenchError;
pub use crate::query::Query;
pub use crate::report::{ReportFormat, Reporter};
pub use crate::retry::RetryPolicy;
pub use crate::runner::{Benchmarks, RunSummary};
pub use crate::sample::Sample;
#[cfg(feature = "sqlite-backend")]
pub use crate::sqlite_backend::{OptimizerProfiles, SqliteBackend};
pub use crate::trial::{TrialExecutor, TrialRunner};
