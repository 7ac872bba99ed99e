//! Error types for reporting and scheduler operations.

use thiserror::Error;

/// Failure cause returned by a single report attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// The inventory service answered with a non-success status.
    #[error("inventory responded {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The attempt was abandoned because the scheduler stopped.
    #[error("report cancelled")]
    Cancelled,
}

/// Errors produced by scheduler construction and control.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The transport could not be created.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
