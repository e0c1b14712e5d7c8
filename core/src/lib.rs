//! Orchestration core for reconnaissance jobs: the job registry and state
//! machine, admission checks (rate limiting and target authorization), and
//! the runner that drives tools through an external scanning engine.

pub mod authorize;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod ratelimiter;
pub mod runner;
pub mod store;

pub use error::{AdmissionError, CancelError, QueryError};
pub use job::{Job, JobStatus, ToolFailure, ToolOptions, ToolOutcome, ToolResult, ToolSpec};
pub use orchestrator::{JobPage, JobResultsView, JobStatusView, Orchestrator, OrchestratorConfig};
pub use ratelimiter::RateLimiter;
pub use runner::ToolInvoker;
pub use store::JobStore;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
