//! Benchmark configuration loaded from a JSON file.
//!
//! ```json
//! {
//!   "database": "memory",
//!   "trials": 10,
//!   "setup": ["CREATE TABLE t(a INTEGER)"],
//!   "retry": { "max_failures": 16, "initial_backoff_ms": 10, "max_backoff_ms": 1000 },
//!   "trial_timeout_ms": 30000,
//!   "optimizers": { "1": { "automatic_index": "OFF" }, "latest": {} },
//!   "queries": [{ "name": "scan", "sql": "SELECT * FROM t", "optimizers": ["1", "latest"] }]
//! }
//! ```

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{BenchError, query::Query, retry::RetryPolicy};

pub const CONFIG_ENV: &str = "PLANBENCH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "planbench.json";

/// PRAGMA name to value, applied while a trial runs under one optimizer version.
pub type PragmaOverrides = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// `"memory"` or a database file path.
    pub database: String,
    pub trials: u32,
    pub setup: Vec<String>,
    pub retry: RetryPolicy,
    pub trial_timeout_ms: Option<u64>,
    /// Optimizer versions on top of the built-in ones; same-named entries replace them.
    pub optimizers: BTreeMap<String, PragmaOverrides>,
    pub queries: Vec<Query>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            database: "memory".to_string(),
            trials: 10,
            setup: Vec::new(),
            retry: RetryPolicy::default(),
            trial_timeout_ms: None,
            optimizers: BTreeMap::new(),
            queries: Vec::new(),
        }
    }
}

impl BenchConfig {
    pub fn from_json(data: &str) -> Result<Self, BenchError> {
        let config: BenchConfig =
            serde_json::from_str(data).map_err(|e| BenchError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let data = fs::read_to_string(path)
            .map_err(|e| BenchError::config(format!("{}: {e}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.queries.is_empty() {
            return Err(BenchError::config("no queries configured"));
        }
        for query in &self.queries {
            query.validate()?;
        }
        if self.optimizers.keys().any(|name| name.trim().is_empty()) {
            return Err(BenchError::config("optimizer version names must not be empty"));
        }
        Ok(())
    }

    pub fn trial_timeout(&self) -> Option<Duration> {
        self.trial_timeout_ms.map(Duration::from_millis)
    }
}

/// Config file to read: the explicit path, then `PLANBENCH_CONFIG`, then `planbench.json`.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    Path::new(DEFAULT_CONFIG_FILE).to_path_buf()
}
