use thiserror::Error;

/// Error type for planbench operations.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("stream error: {0}")]
    StreamError(String),
    #[error("trial timed out: {0}")]
    Timeout(String),
    #[error("unknown optimizer version: {0}")]
    UnknownOptimizer(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("optimizer {optimizer}: gave up after {failures} failed trials, last error: {last_error}")]
    RetriesExhausted {
        optimizer: String,
        failures: u32,
        last_error: String,
    },
}

impl BenchError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        BenchError::ConnectionError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        BenchError::QueryError(msg.into())
    }

    pub fn stream<T: Into<String>>(msg: T) -> Self {
        BenchError::StreamError(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        BenchError::Timeout(msg.into())
    }

    pub fn unknown_optimizer<T: Into<String>>(msg: T) -> Self {
        BenchError::UnknownOptimizer(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        BenchError::ConfigError(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidInput(msg.into())
    }

    /// Whether a failed trial may be discarded and attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BenchError::ConnectionError(_)
                | BenchError::QueryError(_)
                | BenchError::StreamError(_)
                | BenchError::Timeout(_)
        )
    }
}

impl From<rusqlite::Error> for BenchError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, _)
                if code.code == rusqlite::ErrorCode::OperationInterrupted =>
            {
                BenchError::timeout(err.to_string())
            }
            other => BenchError::query(other.to_string()),
        }
    }
}
