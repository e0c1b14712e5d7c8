//! Job entity, status state machine, and per-tool result payloads.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a job: `Pending -> Running -> {Completed, Failed, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

fn default_threads() -> u32 {
    10
}

fn default_timeout() -> u32 {
    5
}

/// Tunables forwarded to the engine module (`THREADS`/`TIMEOUT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOptions {
    #[serde(default = "default_threads")]
    pub threads: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self { threads: default_threads(), timeout_secs: default_timeout() }
    }
}

/// One requested tool invocation: name plus its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub options: ToolOptions,
}

impl ToolSpec {
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string(), options: ToolOptions::default() }
    }
}

/// Why a tool invocation produced no engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailure {
    UnknownTool,
    Timeout,
    ExecutionError,
}

/// Outcome payload of one tool invocation. `Ran` means the engine process
/// finished on its own; a non-zero exit still counts as `Ran` with
/// `success = false`. `Failed` means the invocation never produced a normal
/// engine exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Ran { success: bool, output: String, stderr: String, exit_code: i32 },
    Failed { kind: ToolFailure, message: String },
}

impl ToolOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ToolOutcome::Ran { success: true, .. })
    }
}

/// Recorded result of one tool invocation, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub tool: String,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn ran(tool: &str, exit_code: i32, output: String, stderr: String) -> Self {
        Self {
            tool: tool.to_string(),
            finished_at: OffsetDateTime::now_utc(),
            outcome: ToolOutcome::Ran { success: exit_code == 0, output, stderr, exit_code },
        }
    }

    pub fn failed(tool: &str, kind: ToolFailure, message: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            finished_at: OffsetDateTime::now_utc(),
            outcome: ToolOutcome::Failed { kind, message: message.into() },
        }
    }
}

/// One reconnaissance request and its accumulated execution state.
///
/// All mutation is routed through the [`JobStore`](crate::store::JobStore)
/// registry lock; the transition methods below enforce the state machine and
/// report whether they applied.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub target: String,
    pub profile_name: String,
    pub tools: Vec<ToolSpec>,
    pub status: JobStatus,
    pub created_at: OffsetDateTime,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub results: Vec<ToolResult>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(target: &str, profile_name: &str, tools: Vec<ToolSpec>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target: target.to_string(),
            profile_name: profile_name.to_string(),
            tools,
            status: JobStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            started_at: None,
            completed_at: None,
            results: Vec::new(),
            error: None,
        }
    }

    /// Pending -> Running.
    pub(crate) fn start(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Running;
        self.started_at = Some(OffsetDateTime::now_utc());
        true
    }

    /// Append a result; only legal while Running.
    pub(crate) fn record(&mut self, result: ToolResult) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        debug_assert!(self.results.len() < self.tools.len());
        self.results.push(result);
        true
    }

    /// Running -> Completed.
    pub(crate) fn complete(&mut self) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Completed;
        self.completed_at = Some(OffsetDateTime::now_utc());
        true
    }

    /// Running -> Failed, with the orchestration fault that ended the job.
    pub(crate) fn fail(&mut self, error: String) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Failed;
        self.completed_at = Some(OffsetDateTime::now_utc());
        self.error = Some(error);
        true
    }

    /// Running -> Cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(OffsetDateTime::now_utc());
        true
    }
}
