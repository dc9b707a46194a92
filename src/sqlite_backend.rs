//! [`ProfiledBackend`] over a single SQLite connection.
//!
//! SQLite has no versioned planner, so an optimizer version names a set of
//! planner-affecting PRAGMA overrides. The overrides are applied for one
//! trial and the previous values restored afterwards. Counters come from
//! `sqlite3_stmt_status` and wall-clock timing of the prepare and step phases.

use std::{
    collections::BTreeMap,
    path::Path,
    time::{Duration, Instant},
};

use rusqlite::{
    Connection, OptionalExtension, StatementStatus,
    types::{Value as SqlValue, ValueRef},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    BenchError,
    backend::{BufferedStream, ProfiledBackend, ResultStream, Row},
    config::PragmaOverrides,
    counters::{ProfileCounter, RawProfile},
};

/// Number of VM instructions between two deadline checks.
const PROGRESS_INTERVAL: i32 = 1_000;

/// Optimizer version name to the PRAGMA overrides it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizerProfiles {
    profiles: BTreeMap<String, PragmaOverrides>,
}

impl Default for OptimizerProfiles {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "1".to_string(),
            PragmaOverrides::from([("automatic_index".to_string(), "OFF".to_string())]),
        );
        profiles.insert("latest".to_string(), PragmaOverrides::new());
        Self { profiles }
    }
}

impl OptimizerProfiles {
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Adds or replaces the profiles in `overrides`.
    pub fn merged(mut self, overrides: &BTreeMap<String, PragmaOverrides>) -> Self {
        for (name, pragmas) in overrides {
            self.profiles.insert(name.clone(), pragmas.clone());
        }
        self
    }

    pub fn get(&self, optimizer: &str) -> Option<&PragmaOverrides> {
        self.profiles.get(optimizer)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

pub struct SqliteBackend {
    conn: Connection,
    optimizers: OptimizerProfiles,
    trial_timeout: Option<Duration>,
}

impl SqliteBackend {
    pub fn in_memory() -> Result<Self, BenchError> {
        let conn = Connection::open_in_memory().map_err(|e| BenchError::connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BenchError> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            BenchError::connection(format!("{}: {e}", path.as_ref().display()))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// `"memory"` opens an in-memory database, anything else a file.
    pub fn open_database(database: &str) -> Result<Self, BenchError> {
        if database == "memory" {
            Self::in_memory()
        } else {
            Self::open(database)
        }
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            optimizers: OptimizerProfiles::default(),
            trial_timeout: None,
        }
    }

    pub fn with_optimizers(mut self, optimizers: OptimizerProfiles) -> Self {
        self.optimizers = optimizers;
        self
    }

    pub fn with_trial_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.trial_timeout = timeout;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn optimizers(&self) -> &OptimizerProfiles {
        &self.optimizers
    }

    /// Runs each setup statement once, in order.
    pub fn run_setup(&self, statements: &[String]) -> Result<(), BenchError> {
        for sql in statements {
            self.conn
                .execute_batch(sql)
                .map_err(|e| BenchError::query(format!("setup failed: {e}")))?;
        }
        debug!(statements = statements.len(), "setup applied");
        Ok(())
    }
}

impl ProfiledBackend for SqliteBackend {
    fn execute_profiled<'a>(
        &'a self,
        statement: &str,
        optimizer: &str,
    ) -> Result<Box<dyn ResultStream + 'a>, BenchError> {
        let overrides = self
            .optimizers
            .get(optimizer)
            .ok_or_else(|| BenchError::unknown_optimizer(optimizer))?;
        let _pinned = PragmaGuard::apply(&self.conn, overrides)?;
        let _deadline = self
            .trial_timeout
            .map(|timeout| DeadlineGuard::arm(&self.conn, timeout));

        let started = Instant::now();
        let mut stmt = self.conn.prepare(statement)?;
        let planned = started.elapsed();
        let columns = stmt.column_count();
        let mut rows: Vec<Row> = Vec::new();
        // Only the prepare and step calls are timed; reading column values is ours.
        let mut stepping = Duration::ZERO;
        {
            let mut cursor = stmt.query([])?;
            loop {
                let step_started = Instant::now();
                let next = cursor.next()?;
                stepping += step_started.elapsed();
                let Some(row) = next else { break };
                let mut values = Vec::with_capacity(columns);
                for idx in 0..columns {
                    values.push(json_value(row.get_ref(idx)?));
                }
                rows.push(values);
            }
        }
        let elapsed = planned + stepping;

        let mut profile = RawProfile::new();
        let counter = |c: ProfileCounter| c.key().to_string();
        profile.insert(
            counter(ProfileCounter::RowsScanned),
            stmt.get_status(StatementStatus::FullscanStep).to_string(),
        );
        profile.insert(counter(ProfileCounter::RowsReturned), rows.len().to_string());
        profile.insert(counter(ProfileCounter::QueryPlanCreationTime), msecs(planned));
        // SQLite has no per-statement CPU clock; step wall time stands in.
        profile.insert(
            counter(ProfileCounter::CpuTime),
            msecs(stepping),
        );
        profile.insert(counter(ProfileCounter::ElapsedTime), msecs(elapsed));
        profile.insert(
            "vm_steps".to_string(),
            stmt.get_status(StatementStatus::VmStep).to_string(),
        );
        profile.insert(
            "sort_operations".to_string(),
            stmt.get_status(StatementStatus::Sort).to_string(),
        );
        profile.insert(
            "auto_indexes".to_string(),
            stmt.get_status(StatementStatus::AutoIndex).to_string(),
        );
        Ok(Box::new(BufferedStream::new(rows, profile)))
    }
}

fn msecs(duration: Duration) -> String {
    format!("{:.3} msecs", duration.as_secs_f64() * 1000.0)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}

/// Applies PRAGMA overrides and restores the previous values on drop.
struct PragmaGuard<'c> {
    conn: &'c Connection,
    previous: Vec<(String, SqlValue)>,
}

impl<'c> PragmaGuard<'c> {
    fn apply(conn: &'c Connection, overrides: &PragmaOverrides) -> Result<Self, BenchError> {
        let mut guard = Self {
            conn,
            previous: Vec::with_capacity(overrides.len()),
        };
        for (name, value) in overrides {
            let current = conn
                .pragma_query_value(None, name, |row| row.get::<_, SqlValue>(0))
                .optional()?;
            conn.pragma_update(None, name, value)
                .map_err(|e| BenchError::query(format!("PRAGMA {name} = {value}: {e}")))?;
            if let Some(current) = current {
                guard.previous.push((name.clone(), current));
            }
        }
        Ok(guard)
    }
}

impl Drop for PragmaGuard<'_> {
    fn drop(&mut self) {
        for (name, value) in self.previous.iter().rev() {
            if let Err(err) = self.conn.pragma_update(None, name, value) {
                warn!(pragma = %name, error = %err, "failed to restore pragma");
            }
        }
    }
}

/// Interrupts the running statement once the deadline passes.
struct DeadlineGuard<'c> {
    conn: &'c Connection,
}

impl<'c> DeadlineGuard<'c> {
    fn arm(conn: &'c Connection, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        conn.progress_handler(PROGRESS_INTERVAL, Some(move || Instant::now() >= deadline));
        Self { conn }
    }
}

impl Drop for DeadlineGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
