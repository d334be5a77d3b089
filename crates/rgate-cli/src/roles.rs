//! `rgate roles` - validate mutation roles before a run.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use rgate_core::{Account, MutationPlan, MutationStrategy, VariableConfig, prepare_mutation_roles};
use serde::Deserialize;

use crate::input::{print_json, read_json};

/// Arguments for `rgate roles`.
#[derive(Args, Debug)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommands,
}

/// Role subcommands.
#[derive(Subcommand, Debug)]
pub enum RolesCommands {
    /// Compute account pools and coverage for a strategy.
    ///
    /// Exits 1 when the strategy cannot be satisfied.
    Validate(ValidateArgs),
}

/// Arguments for `rgate roles validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Accounts, variables, strategy and attacker id (JSON). Use "-" for stdin.
    #[arg(long)]
    pub input: PathBuf,

    /// Output the full plan as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
struct RolesInput {
    accounts: Vec<Account>,
    variables: Vec<VariableConfig>,
    #[serde(default)]
    strategy: MutationStrategy,
    #[serde(default)]
    attacker_account_id: Option<String>,
}

/// Run a roles subcommand.
pub fn run(args: &RolesArgs) -> Result<u8> {
    match &args.command {
        RolesCommands::Validate(validate) => run_validate(validate),
    }
}

fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let input: RolesInput = read_json(&args.input, "roles input")?;
    let plan = prepare_mutation_roles(
        &input.accounts,
        &input.variables,
        input.strategy,
        input.attacker_account_id.as_deref(),
    );

    if args.json {
        print_json(&plan)?;
    } else {
        print_plan(&plan);
    }
    Ok(u8::from(!plan.valid))
}

fn print_plan(plan: &MutationPlan) {
    println!(
        "Strategy: {} ({})",
        plan.report.strategy,
        if plan.valid { "valid" } else { "invalid" }
    );
    for var in &plan.report.variables {
        println!(
            "  {} [{}] {}/{} present ({:.0}%) {:?}",
            var.variable,
            var.role.as_str(),
            var.present,
            var.pool_total,
            var.coverage_rate * 100.0,
            var.severity
        );
    }
    for error in &plan.report.fatal_errors {
        println!("fatal: {error}");
    }
    for warning in &plan.report.warnings {
        println!("warning: {warning}");
    }
    let ids: Vec<&str> = plan.filtered_accounts.iter().map(|a| a.id.as_str()).collect();
    println!("Accounts: {}", ids.join(", "));
}
