//! Composition root: admission checks, job creation, background runner
//! scheduling, and the query/cancel operations a transport layer calls.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authorize;
use crate::error::{AdmissionError, CancelError, QueryError};
use crate::job::{Job, JobStatus, ToolResult, ToolSpec};
use crate::ratelimiter::RateLimiter;
use crate::runner::{self, ToolInvoker};
use crate::store::JobStore;

pub const DEFAULT_PROFILE_NAME: &str = "Unnamed Scan";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Admissions allowed per client per minute.
    pub requests_per_minute: usize,
    /// Root under which each job gets its own scratch directory.
    pub work_root: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: crate::ratelimiter::DEFAULT_LIMIT,
            work_root: PathBuf::from("./workspace"),
        }
    }
}

/// Status summary for one job, as returned to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusView {
    pub id: Uuid,
    pub target: String,
    pub profile_name: String,
    pub status: JobStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub error: Option<String>,
    pub results_count: usize,
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            target: job.target.clone(),
            profile_name: job.profile_name.clone(),
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            error: job.error.clone(),
            results_count: job.results.len(),
        }
    }
}

/// Full results for one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobResultsView {
    pub id: Uuid,
    pub status: JobStatus,
    pub results: Vec<ToolResult>,
    pub error: Option<String>,
}

/// One page of the job listing.
#[derive(Debug, Clone, Serialize)]
pub struct JobPage {
    pub jobs: Vec<JobStatusView>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

pub struct Orchestrator {
    store: Arc<JobStore>,
    limiter: RateLimiter,
    invoker: Arc<dyn ToolInvoker>,
    work_root: PathBuf,
    /// Join handles of spawned runners, kept so the execution strategy is
    /// explicit and shutdown can be layered on later.
    runners: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            store: Arc::new(JobStore::new()),
            limiter: RateLimiter::new(config.requests_per_minute),
            invoker,
            work_root: config.work_root,
            runners: Mutex::new(HashMap::new()),
        }
    }

    /// Admit, create, and schedule a job. The runner executes in the
    /// background; the caller gets the job id immediately and polls for
    /// progress.
    pub async fn create_job(
        &self,
        target: &str,
        profile_name: &str,
        tools: Vec<ToolSpec>,
        client_id: &str,
    ) -> Result<Uuid, AdmissionError> {
        if !self.limiter.admit(client_id) {
            warn!(client = client_id, "admission rejected: rate limit exceeded");
            return Err(AdmissionError::RateLimited);
        }
        if !authorize::is_authorized(target) {
            warn!(client = client_id, target, "admission rejected: target not allowed");
            return Err(AdmissionError::Unauthorized);
        }

        let profile = if profile_name.trim().is_empty() { DEFAULT_PROFILE_NAME } else { profile_name };
        let job = Job::new(target, profile, tools);
        let id = self.store.insert(job).await;
        info!(job = %id, target, client = client_id, "job admitted");

        let store = Arc::clone(&self.store);
        let invoker = Arc::clone(&self.invoker);
        let work_root = self.work_root.clone();
        let handle = tokio::spawn(async move {
            runner::run_job(&store, invoker.as_ref(), &work_root, id).await;
        });
        self.runners.lock().unwrap().insert(id, handle);
        Ok(id)
    }

    pub async fn job_status(&self, id: Uuid) -> Result<JobStatusView, QueryError> {
        let job = self.store.get(id).await.ok_or(QueryError::NotFound)?;
        Ok(JobStatusView::from(&job))
    }

    pub async fn job_results(&self, id: Uuid) -> Result<JobResultsView, QueryError> {
        let job = self.store.get(id).await.ok_or(QueryError::NotFound)?;
        Ok(JobResultsView { id: job.id, status: job.status, results: job.results, error: job.error })
    }

    pub async fn list_jobs(&self, offset: usize, limit: usize) -> JobPage {
        let (page, total) = self.store.page(offset, limit).await;
        JobPage {
            jobs: page.iter().map(JobStatusView::from).collect(),
            total,
            offset,
            limit,
        }
    }

    /// Cancel a Running job. The marker takes effect at the runner's next
    /// check-point; an in-flight engine process is not interrupted.
    pub async fn cancel_job(&self, id: Uuid) -> Result<(), CancelError> {
        self.store.cancel(id).await?;
        info!(job = %id, "job cancelled");
        Ok(())
    }

    /// Await the background runner for `id`, if one was spawned. Used by
    /// in-process callers (tests, CLI) that want completion rather than
    /// polling.
    pub async fn wait_for(&self, id: Uuid) {
        let handle = self.runners.lock().unwrap().remove(&id);
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
