use serde::{Deserialize, Serialize};

use crate::BenchError;

/// A named statement and the optimizer versions to compare it under, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub sql: String,
    pub optimizers: Vec<String>,
}

impl Query {
    pub fn new<N, S>(name: N, sql: S, optimizers: &[&str]) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            sql: sql.into(),
            optimizers: optimizers.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.name.trim().is_empty() {
            return Err(BenchError::config("query name must not be empty"));
        }
        if self.sql.trim().is_empty() {
            return Err(BenchError::config(format!(
                "query {} has an empty statement",
                self.name
            )));
        }
        if self.optimizers.is_empty() {
            return Err(BenchError::config(format!(
                "query {} lists no optimizer versions",
                self.name
            )));
        }
        if self.optimizers.iter().any(|v| v.trim().is_empty()) {
            return Err(BenchError::config(format!(
                "query {} lists an empty optimizer version",
                self.name
            )));
        }
        Ok(())
    }
}
