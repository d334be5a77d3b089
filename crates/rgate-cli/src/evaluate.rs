//! `rgate evaluate` - score finding counts against a policy.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rgate_core::{GateCalculation, GatePolicy, OriginEvaluation, evaluate_gate};

use crate::input::{print_json, read_json};

/// Arguments for `rgate evaluate`.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Findings from template test runs.
    #[arg(long, default_value_t = 0)]
    pub test_findings: u64,

    /// Findings from workflow runs.
    #[arg(long, default_value_t = 0)]
    pub workflow_findings: u64,

    /// Gate policy (JSON). Use "-" for stdin. Defaults to the built-in policy.
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Treat the run as having had an execution error.
    #[arg(long)]
    pub execution_error: bool,

    /// Output the full calculation as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the evaluation; returns the gate exit code.
pub fn run(args: &EvaluateArgs) -> Result<u8> {
    let policy = match &args.policy {
        Some(path) => read_json::<GatePolicy>(path, "gate policy")?,
        None => GatePolicy::default_policy(),
    };
    policy
        .validate()
        .with_context(|| format!("gate policy {} is invalid", policy.id))?;
    for warning in policy.lint() {
        tracing::warn!(policy_id = %policy.id, warning = %warning, "gate policy lint");
    }

    let calculation = evaluate_gate(
        args.test_findings,
        args.workflow_findings,
        &policy,
        args.execution_error,
    );

    if args.json {
        print_json(&calculation)?;
    } else {
        print_calculation(&policy, &calculation);
    }
    Ok(calculation.exit_code.code())
}

fn print_calculation(policy: &GatePolicy, calc: &GateCalculation) {
    println!("Policy: {} ({})", policy.id, calc.combine_operator);
    print_origin("test", &calc.test);
    print_origin("workflow", &calc.workflow);
    if calc.forced_block {
        println!("Execution error: forced BLOCK (was {})", calc.combined_action);
    }
    println!("Gate: {} (exit {})", calc.final_action, calc.exit_code);
}

fn print_origin(label: &str, origin: &OriginEvaluation) {
    match (origin.score, origin.matched_rule) {
        (None, _) => println!("  {label}: {} findings, unweighted -> PASS", origin.findings),
        (Some(score), Some(rule)) => println!(
            "  {label}: {} findings x {}% = {score}, rule {rule}",
            origin.findings, origin.weight
        ),
        (Some(score), None) => println!(
            "  {label}: {} findings x {}% = {score}, no rule matched -> PASS",
            origin.findings, origin.weight
        ),
    }
}
