//! Metasploit engine driver: resolves tool names against the static catalog
//! and executes them by feeding `msfconsole` a generated resource script
//! under a wall-clock deadline.

pub mod catalog;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use recond_core::job::{ToolFailure, ToolOptions, ToolResult, ToolSpec};
use recond_core::runner::ToolInvoker;

pub const DEFAULT_MSF_PATH: &str = "/opt/metasploit-framework";
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct MsfConfig {
    /// Metasploit installation root; `msfconsole` is expected inside it.
    pub msf_path: PathBuf,
    /// Hard wall-clock limit for one engine invocation.
    pub deadline: Duration,
}

impl Default for MsfConfig {
    fn default() -> Self {
        let msf_path = std::env::var_os("MSF_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MSF_PATH));
        Self { msf_path, deadline: DEFAULT_DEADLINE }
    }
}

impl MsfConfig {
    pub fn console_path(&self) -> PathBuf {
        self.msf_path.join("msfconsole")
    }
}

/// Render the resource script: select the module, point it at the target,
/// apply the tunables, run, and leave the console.
fn resource_script(module: &str, target: &str, options: &ToolOptions) -> String {
    format!(
        "use {module}\nset RHOSTS {target}\nset THREADS {threads}\nset TIMEOUT {timeout}\nrun\nexit\n",
        threads = options.threads,
        timeout = options.timeout_secs,
    )
}

pub struct MsfInvoker {
    config: MsfConfig,
}

impl MsfInvoker {
    pub fn new(config: MsfConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolInvoker for MsfInvoker {
    /// One attempt, no retries. Every tool-level failure comes back as
    /// result data; `Err` never leaves this method.
    async fn invoke(
        &self,
        spec: &ToolSpec,
        target: &str,
        work_dir: &Path,
    ) -> anyhow::Result<ToolResult> {
        let Some(entry) = catalog::lookup(&spec.name) else {
            return Ok(ToolResult::failed(
                &spec.name,
                ToolFailure::UnknownTool,
                format!("unknown tool: {}", spec.name),
            ));
        };

        let script_path = work_dir.join(format!("{}.rc", spec.name));
        let output_path = work_dir.join(format!("{}_output.txt", spec.name));
        let script = resource_script(entry.module, target, &spec.options);
        if let Err(e) = tokio::fs::write(&script_path, script).await {
            return Ok(ToolResult::failed(
                &spec.name,
                ToolFailure::ExecutionError,
                format!("failed to write resource script: {e}"),
            ));
        }

        let console = self.config.console_path();
        debug!(tool = %spec.name, module = entry.module, console = %console.display(), "launching engine");
        let mut cmd = Command::new(&console);
        cmd.arg("-r")
            .arg(&script_path)
            .arg("-o")
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // Deadline expiry drops the child; take the engine down with it.
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Ok(ToolResult::failed(
                    &spec.name,
                    ToolFailure::ExecutionError,
                    format!("failed to launch {}: {e}", console.display()),
                ));
            }
        };

        match timeout(self.config.deadline, child.wait_with_output()).await {
            Ok(Ok(out)) => {
                // Absent output file means the module produced nothing.
                let output = tokio::fs::read_to_string(&output_path).await.unwrap_or_default();
                let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
                let exit_code = out.status.code().unwrap_or(-1);
                Ok(ToolResult::ran(&spec.name, exit_code, output, stderr))
            }
            Ok(Err(e)) => Ok(ToolResult::failed(&spec.name, ToolFailure::ExecutionError, e.to_string())),
            Err(_) => {
                warn!(tool = %spec.name, deadline_secs = self.config.deadline.as_secs(), "engine exceeded deadline");
                Ok(ToolResult::failed(
                    &spec.name,
                    ToolFailure::Timeout,
                    format!("tool execution timed out after {}s", self.config.deadline.as_secs()),
                ))
            }
        }
    }
}
