use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use msf_engine::{MsfConfig, MsfInvoker};
use recond_core::{Orchestrator, OrchestratorConfig, ToolOptions, ToolSpec};

mod config;

#[derive(Debug, Parser)]
#[command(name = "recond", version, about = "Reconnaissance job orchestration backend")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./recond.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// List available reconnaissance tools (JSON lines)
    Tools,
    /// Run a scan profile against a target and wait for its results
    Scan {
        /// Target host or IP; must fall inside the scanning allow-list
        target: String,
        /// Display name for this scan
        #[arg(long, default_value = "Unnamed Scan")]
        profile: String,
        /// Tool to run, repeatable, in execution order
        #[arg(long = "tool", required = true)]
        tools: Vec<String>,
        /// THREADS option applied to every tool
        #[arg(long, default_value_t = 10)]
        threads: u32,
        /// TIMEOUT option applied to every tool
        #[arg(long, default_value_t = 5)]
        timeout: u32,
        /// Poll interval in milliseconds while waiting for the job
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let loaded_cfg = config::load_config(cli.config.as_deref());

    match cli.command {
        Commands::Version => {
            println!("recond {} (core {})", env!("CARGO_PKG_VERSION"), recond_core::version());
        }
        Commands::Tools => {
            for t in msf_engine::catalog::CATALOG {
                let obj = serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "category": t.category,
                    "config_options": t.config_options,
                });
                println!("{}", serde_json::to_string(&obj)?);
            }
        }
        Commands::Scan { target, profile, tools, threads, timeout, poll_ms } => {
            let mut orch_cfg = OrchestratorConfig::default();
            let mut msf_cfg = MsfConfig::default();
            if let Some(cfg) = &loaded_cfg {
                if let Some(dir) = &cfg.workspace_dir {
                    orch_cfg.work_root = PathBuf::from(dir);
                }
                if let Some(limits) = &cfg.limits {
                    if let Some(rpm) = limits.requests_per_minute {
                        orch_cfg.requests_per_minute = rpm;
                    }
                }
                if let Some(engine) = &cfg.engine {
                    if let Some(path) = &engine.msf_path {
                        msf_cfg.msf_path = PathBuf::from(path);
                    }
                    if let Some(secs) = engine.deadline_secs {
                        msf_cfg.deadline = Duration::from_secs(secs);
                    }
                }
            }

            let specs: Vec<ToolSpec> = tools
                .iter()
                .map(|name| ToolSpec {
                    name: name.clone(),
                    options: ToolOptions { threads, timeout_secs: timeout },
                })
                .collect();

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async move {
                let orch = Orchestrator::new(orch_cfg, Arc::new(MsfInvoker::new(msf_cfg)));
                let id = orch.create_job(&target, &profile, specs, "127.0.0.1").await?;
                println!("{}", serde_json::json!({ "job_id": id, "status": "pending" }));

                loop {
                    let status = orch.job_status(id).await?;
                    if status.status.is_terminal() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(poll_ms)).await;
                }

                let results = orch.job_results(id).await?;
                println!("{}", serde_json::to_string(&results)?);
                Ok::<_, anyhow::Error>(())
            })?;
        }
    }
    Ok(())
}
