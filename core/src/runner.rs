//! Per-job execution: drives one job from Pending to a terminal state,
//! invoking each requested tool in order through the [`ToolInvoker`] seam.

use std::path::Path;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::job::{JobStatus, ToolResult, ToolSpec};
use crate::store::JobStore;

/// Executes one tool against a target inside the job's scratch directory.
///
/// `Ok` carries every tool-level outcome, including failures recorded as
/// data (unknown tool, timeout, execution error). `Err` is reserved for
/// faults in the invocation pipeline itself and drives the whole job to
/// Failed.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(
        &self,
        spec: &ToolSpec,
        target: &str,
        work_dir: &Path,
    ) -> anyhow::Result<ToolResult>;
}

/// Run the job to a terminal state. Tools execute strictly in declared
/// order, one at a time; each result is appended under the registry lock as
/// soon as its invocation finishes, so concurrent readers see partial
/// progress. Cancellation is observed only between invocations.
pub async fn run_job(store: &JobStore, invoker: &dyn ToolInvoker, work_root: &Path, id: Uuid) {
    let Some(job) = store.get(id).await else {
        warn!(job = %id, "runner started for unknown job");
        return;
    };
    if !store.mark_running(id).await {
        warn!(job = %id, "runner started for a job that is not pending");
        return;
    }
    info!(job = %id, target = %job.target, tools = job.tools.len(), "job started");

    let job_dir = work_root.join(id.to_string());
    if let Err(e) = tokio::fs::create_dir_all(&job_dir).await {
        error!(job = %id, error = %e, "failed to create job scratch directory");
        store.fail(id, format!("failed to create job scratch directory: {e}")).await;
        return;
    }

    for spec in &job.tools {
        if store.status(id).await != Some(JobStatus::Running) {
            info!(job = %id, "cancel observed, stopping before {}", spec.name);
            break;
        }
        match invoker.invoke(spec, &job.target, &job_dir).await {
            Ok(result) => {
                if !result.outcome.succeeded() {
                    warn!(job = %id, tool = %spec.name, "tool reported failure");
                }
                store.append_result(id, result).await;
            }
            Err(fault) => {
                error!(job = %id, tool = %spec.name, error = %fault, "tool pipeline fault");
                store.fail(id, fault.to_string()).await;
                return;
            }
        }
    }

    let status = store.complete(id).await;
    info!(job = %id, status = %status.map(|s| s.to_string()).unwrap_or_default(), "job finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, ToolFailure, ToolOutcome};
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted invoker: one canned reply per tool, in order. Counts calls
    /// and can cancel its own job mid-run to exercise the check-points.
    struct Scripted {
        replies: Vec<Reply>,
        calls: AtomicUsize,
        cancel_after_first: Option<Arc<JobStore>>,
        job: Uuid,
    }

    enum Reply {
        Exit(i32),
        Fault(&'static str),
        Failure(ToolFailure),
    }

    impl Scripted {
        fn new(job: Uuid, replies: Vec<Reply>) -> Self {
            Self { replies, calls: AtomicUsize::new(0), cancel_after_first: None, job }
        }
    }

    #[async_trait]
    impl ToolInvoker for Scripted {
        async fn invoke(
            &self,
            spec: &ToolSpec,
            _target: &str,
            _work_dir: &Path,
        ) -> anyhow::Result<ToolResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                if let Some(store) = &self.cancel_after_first {
                    store.cancel(self.job).await.unwrap();
                }
            }
            match &self.replies[n] {
                Reply::Exit(code) => {
                    Ok(ToolResult::ran(&spec.name, *code, "out".into(), String::new()))
                }
                Reply::Fault(msg) => Err(anyhow!(*msg)),
                Reply::Failure(kind) => Ok(ToolResult::failed(&spec.name, *kind, "no engine exit")),
            }
        }
    }

    fn two_tool_job() -> Job {
        Job::new("10.0.0.5", "test", vec![ToolSpec::named("ping-sweep"), ToolSpec::named("dns-enum")])
    }

    #[tokio::test]
    async fn all_tools_run_and_job_completes() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let id = store.insert(two_tool_job()).await;
        let invoker = Scripted::new(id, vec![Reply::Exit(0), Reply::Exit(0)]);

        run_job(&store, &invoker, dir.path(), id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.results.len(), 2);
        assert_eq!(job.results[0].tool, "ping-sweep");
        assert_eq!(job.results[1].tool, "dns-enum");
        assert!(dir.path().join(id.to_string()).is_dir());
    }

    #[tokio::test]
    async fn tool_failure_is_recorded_and_run_continues() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let id = store.insert(two_tool_job()).await;
        let invoker = Scripted::new(id, vec![Reply::Exit(2), Reply::Exit(0)]);

        run_job(&store, &invoker, dir.path(), id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.results.len(), 2);
        assert!(!job.results[0].outcome.succeeded());
        assert!(job.results[1].outcome.succeeded());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn recorded_failure_kinds_do_not_fail_the_job() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let id = store.insert(two_tool_job()).await;
        let invoker =
            Scripted::new(id, vec![Reply::Failure(ToolFailure::Timeout), Reply::Exit(0)]);

        run_job(&store, &invoker, dir.path(), id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.results.len(), 2);
        assert!(matches!(
            job.results[0].outcome,
            ToolOutcome::Failed { kind: ToolFailure::Timeout, .. }
        ));
    }

    #[tokio::test]
    async fn pipeline_fault_fails_the_job_and_stops_execution() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let id = store.insert(two_tool_job()).await;
        let invoker = Scripted::new(id, vec![Reply::Fault("engine unavailable"), Reply::Exit(0)]);

        run_job(&store, &invoker, dir.path(), id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.results.len(), 0);
        assert_eq!(job.error.as_deref(), Some("engine unavailable"));
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_between_tools_stops_the_run() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let id = store.insert(two_tool_job()).await;
        let mut invoker = Scripted::new(id, vec![Reply::Exit(0), Reply::Exit(0)]);
        invoker.cancel_after_first = Some(Arc::clone(&store));

        run_job(&store, &invoker, dir.path(), id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        // The in-flight result arrived after the cancel and was refused.
        assert_eq!(job.results.len(), 0);
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
        assert!(job.completed_at.is_some());
    }

    #[tokio::test]
    async fn unwritable_work_root_fails_the_job() {
        let store = Arc::new(JobStore::new());
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let id = store.insert(two_tool_job()).await;
        let invoker = Scripted::new(id, vec![Reply::Exit(0), Reply::Exit(0)]);

        // work_root sits below a regular file, so mkdir must fail.
        run_job(&store, &invoker, &blocker, id).await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.results.is_empty());
        assert!(job.error.as_deref().unwrap_or_default().contains("scratch"));
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }
}
