//! `rgate run` - replay a recorded batch through the gate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rgate_runner::{GateConfig, GateRunResult, ReplayPlan, replay};

use crate::input::{print_json, read_json};

/// Arguments for `rgate run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Replay plan (JSON): request, policies and recorded outcomes. Use "-"
    /// for stdin.
    #[arg(long)]
    pub plan: PathBuf,

    /// Configuration file (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output the run result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Load `--config`, or defaults when absent.
    pub fn load_config(&self) -> Result<GateConfig> {
        self.config.as_ref().map_or_else(
            || Ok(GateConfig::default()),
            |path| {
                GateConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))
            },
        )
    }
}

/// Run the replay; returns the gate exit code.
pub fn run(args: &RunArgs, config: &GateConfig) -> Result<u8> {
    let plan: ReplayPlan = read_json(&args.plan, "replay plan")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    match runtime.block_on(replay(plan, config)) {
        Ok(result) => {
            if args.json {
                print_json(&result)?;
            } else {
                print_result(&result);
            }
            Ok(result.exit_code.code())
        }
        Err(err) => {
            let code = err.exit_code().code();
            if args.json {
                print_json(&serde_json::json!({
                    "error": err.to_string(),
                    "security_run_id": err.run_id(),
                    "exit_code": code,
                }))?;
            } else {
                eprintln!("error: {err}");
            }
            Ok(code)
        }
    }
}

fn print_result(result: &GateRunResult) {
    println!("Security run: {}", result.security_run_id);
    println!("Policy: {}", result.policy_id);
    println!("Status: {}", result.status);
    println!(
        "Findings: {} test, {} workflow (score {})",
        result.test_findings, result.workflow_findings, result.gate_score
    );
    for error in &result.errors {
        println!("  error: {error}");
    }
    println!("Gate: {} (exit {})", result.gate_action, result.exit_code);
}
