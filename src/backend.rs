//! Boundary between the benchmark engine and the database that executes the
//! statements. A backend runs a statement in profiling mode with the optimizer
//! pinned for that one call and hands back a [`ResultStream`]; the counters
//! attached to the stream only become available once it has been drained.

use serde_json::Value;

use crate::{BenchError, counters::RawProfile};

/// One result row. The benchmark never inspects row contents.
pub type Row = Vec<Value>;

/// Rows of one profiled execution, followed by its profiling counters.
pub trait ResultStream {
    /// Next row, `Ok(None)` once the stream has completed.
    fn next_row(&mut self) -> Result<Option<Row>, BenchError>;

    /// Counters of the execution. `None` until [`next_row`](Self::next_row)
    /// has returned `Ok(None)`.
    fn query_stats(&self) -> Option<&RawProfile>;
}

pub trait ProfiledBackend {
    /// Executes `statement` with profiling enabled and the optimizer forced
    /// to `optimizer` for this call only.
    fn execute_profiled<'a>(
        &'a self,
        statement: &str,
        optimizer: &str,
    ) -> Result<Box<dyn ResultStream + 'a>, BenchError>;
}

impl<B: ProfiledBackend + ?Sized> ProfiledBackend for &B {
    fn execute_profiled<'a>(
        &'a self,
        statement: &str,
        optimizer: &str,
    ) -> Result<Box<dyn ResultStream + 'a>, BenchError> {
        (**self).execute_profiled(statement, optimizer)
    }
}

/// Stream over rows that are already materialized, releasing its counters
/// once the last row has been handed out.
#[derive(Debug)]
pub struct BufferedStream {
    rows: std::vec::IntoIter<Row>,
    pending: Option<RawProfile>,
    stats: Option<RawProfile>,
}

impl BufferedStream {
    pub fn new(rows: Vec<Row>, profile: RawProfile) -> Self {
        Self {
            rows: rows.into_iter(),
            pending: Some(profile),
            stats: None,
        }
    }
}

impl ResultStream for BufferedStream {
    fn next_row(&mut self) -> Result<Option<Row>, BenchError> {
        match self.rows.next() {
            Some(row) => Ok(Some(row)),
            None => {
                if let Some(profile) = self.pending.take() {
                    self.stats = Some(profile);
                }
                Ok(None)
            }
        }
    }

    fn query_stats(&self) -> Option<&RawProfile> {
        self.stats.as_ref()
    }
}
