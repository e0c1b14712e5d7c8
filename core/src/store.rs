//! Concurrent job registry. The store owns the only mutable copy of every
//! job; creation, runner writes, and cancel requests all serialize through
//! its lock.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CancelError;
use crate::job::{Job, JobStatus, ToolResult};

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created job and return its id.
    pub async fn insert(&self, job: Job) -> Uuid {
        let id = job.id;
        self.jobs.write().await.insert(id, job);
        id
    }

    /// Snapshot of a job at this instant.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.jobs.read().await.get(&id).map(|j| j.status)
    }

    /// Page of jobs sorted by creation time, newest first, plus the total
    /// count before paging.
    pub async fn page(&self, offset: usize, limit: usize) -> (Vec<Job>, usize) {
        let jobs = self.jobs.read().await;
        let mut all: Vec<&Job> = jobs.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len();
        let page = all.into_iter().skip(offset).take(limit).cloned().collect();
        (page, total)
    }

    /// Pending -> Running. False when the job is missing or already past
    /// Pending.
    pub async fn mark_running(&self, id: Uuid) -> bool {
        self.jobs.write().await.get_mut(&id).is_some_and(|j| j.start())
    }

    /// Append a tool result. Appends are refused once the job has left
    /// Running; the caller learns the observed status either way.
    pub async fn append_result(&self, id: Uuid, result: ToolResult) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id)?;
        job.record(result);
        Some(job.status)
    }

    /// Running -> Completed. A job already cancelled or failed is left as is.
    pub async fn complete(&self, id: Uuid) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id)?;
        job.complete();
        Some(job.status)
    }

    /// Running -> Failed with the orchestration fault message.
    pub async fn fail(&self, id: Uuid, error: String) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id)?;
        job.fail(error);
        Some(job.status)
    }

    /// Running -> Cancelled. Pending and terminal jobs are not cancellable.
    pub async fn cancel(&self, id: Uuid) -> Result<(), CancelError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(CancelError::NotFound)?;
        if job.cancel() { Ok(()) } else { Err(CancelError::InvalidState) }
    }
}
