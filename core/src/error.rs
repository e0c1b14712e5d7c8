//! Error taxonomy for the boundary operations. Tool-level failures are not
//! errors: they are recorded into job results as data (see
//! [`ToolFailure`](crate::job::ToolFailure)).

use thiserror::Error;

/// Rejections raised before a job is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("target not authorized for scanning")]
    Unauthorized,
}

/// Lookup failures on the query operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("job not found")]
    NotFound,
}

/// Failures of the cancel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelError {
    #[error("job not found")]
    NotFound,
    #[error("job cannot be cancelled in its current status")]
    InvalidState,
}
