//! Scripted stand-ins for the database and the trial executor.

use std::collections::VecDeque;

use ahash::AHashMap;
use parking_lot::Mutex;
use serde_json::json;

use crate::{
    BenchError,
    backend::{BufferedStream, ProfiledBackend, ResultStream, Row},
    counters::RawProfile,
    sample::Sample,
    trial::TrialRunner,
};

/// Builds a [`RawProfile`] from counter name/value pairs.
pub fn raw_profile(pairs: &[(&str, &str)]) -> RawProfile {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Clone, Debug)]
pub enum ScriptedResponse {
    /// Streams `rows` rows, then exposes `profile`.
    Rows { rows: usize, profile: RawProfile },
    /// Fails before any row is produced.
    Fail(String),
    /// Streams `rows` rows, then fails.
    FailMidStream { rows: usize, error: String },
    /// Completes without ever exposing counters.
    NoStats { rows: usize },
}

/// Backend that replays queued responses, then falls back to a per-optimizer default.
#[derive(Default)]
pub struct ScriptedBackend {
    defaults: Mutex<AHashMap<String, ScriptedResponse>>,
    queued: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(self, optimizer: &str, response: ScriptedResponse) -> Self {
        self.defaults.lock().insert(optimizer.to_string(), response);
        self
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.queued.lock().push_back(response);
    }

    /// `(optimizer, statement)` of every call, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

impl ProfiledBackend for ScriptedBackend {
    fn execute_profiled<'a>(
        &'a self,
        statement: &str,
        optimizer: &str,
    ) -> Result<Box<dyn ResultStream + 'a>, BenchError> {
        self.calls
            .lock()
            .push((optimizer.to_string(), statement.to_string()));
        let response = match self.queued.lock().pop_front() {
            Some(response) => response,
            None => self
                .defaults
                .lock()
                .get(optimizer)
                .cloned()
                .ok_or_else(|| BenchError::unknown_optimizer(optimizer))?,
        };
        match response {
            ScriptedResponse::Rows { rows, profile } => {
                Ok(Box::new(BufferedStream::new(numbered_rows(rows), profile)))
            }
            ScriptedResponse::Fail(error) => Err(BenchError::query(error)),
            ScriptedResponse::FailMidStream { rows, error } => Ok(Box::new(ScriptedStream {
                remaining: rows,
                error: Some(error),
            })),
            ScriptedResponse::NoStats { rows } => Ok(Box::new(ScriptedStream {
                remaining: rows,
                error: None,
            })),
        }
    }
}

fn numbered_rows(count: usize) -> Vec<Row> {
    (0..count).map(|idx| vec![json!(idx)]).collect()
}

struct ScriptedStream {
    remaining: usize,
    error: Option<String>,
}

impl ResultStream for ScriptedStream {
    fn next_row(&mut self) -> Result<Option<Row>, BenchError> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(Some(vec![json!(self.remaining)]));
        }
        match self.error.take() {
            Some(error) => Err(BenchError::stream(error)),
            None => Ok(None),
        }
    }

    fn query_stats(&self) -> Option<&RawProfile> {
        None
    }
}

/// Trial runner that replays queued outcomes, then returns a per-optimizer default sample.
#[derive(Default)]
pub struct ScriptedTrial {
    defaults: Mutex<AHashMap<String, Sample>>,
    queued: Mutex<VecDeque<Result<Sample, BenchError>>>,
    calls: Mutex<usize>,
}

impl ScriptedTrial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(self, sample: Sample) -> Self {
        self.defaults.lock().insert(sample.optimizer.clone(), sample);
        self
    }

    pub fn push(&self, outcome: Result<Sample, BenchError>) {
        self.queued.lock().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl TrialRunner for ScriptedTrial {
    fn run_trial(&self, optimizer: &str, _statement: &str) -> Result<Sample, BenchError> {
        *self.calls.lock() += 1;
        if let Some(outcome) = self.queued.lock().pop_front() {
            return outcome;
        }
        self.defaults
            .lock()
            .get(optimizer)
            .cloned()
            .ok_or_else(|| BenchError::unknown_optimizer(optimizer))
    }
}
