//! `rgate drop-rules` - check contexts against suppression rules.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rgate_core::{DropContext, DropRule, DropRuleDraft, DropRuleSet, preview_drop_rule};

use crate::input::{print_json, read_json};

/// Arguments for `rgate drop-rules`.
#[derive(Args, Debug)]
pub struct DropRulesArgs {
    #[command(subcommand)]
    pub command: DropRulesCommands,
}

/// Drop-rule subcommands.
#[derive(Subcommand, Debug)]
pub enum DropRulesCommands {
    /// Check a finding context against a rule list.
    Check(CheckArgs),

    /// Test a single unsaved rule against a context.
    Preview(PreviewArgs),
}

/// Arguments for `rgate drop-rules check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Drop rules (JSON array). Use "-" for stdin.
    #[arg(long)]
    pub rules: PathBuf,

    /// Finding context (JSON).
    #[arg(long)]
    pub context: PathBuf,

    /// Output the decision as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `rgate drop-rules preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Rule draft (JSON); unset fields take their defaults.
    #[arg(long)]
    pub rule: PathBuf,

    /// Finding context (JSON).
    #[arg(long)]
    pub context: PathBuf,
}

/// Run a drop-rules subcommand.
pub fn run(args: &DropRulesArgs) -> Result<u8> {
    match &args.command {
        DropRulesCommands::Check(check) => run_check(check),
        DropRulesCommands::Preview(preview) => run_preview(preview),
    }
}

fn run_check(args: &CheckArgs) -> Result<u8> {
    let rules: Vec<DropRule> = read_json(&args.rules, "drop rules")?;
    let context: DropContext = read_json(&args.context, "drop context")?;

    let set = DropRuleSet::new(rules);
    tracing::debug!(enabled_rules = set.len(), "drop rules compiled");
    let decision = set.check(&context);

    if args.json {
        print_json(&decision)?;
    } else if decision.dropped {
        println!(
            "dropped by rule {} ({})",
            decision.rule_id.as_deref().unwrap_or_default(),
            decision.rule_name.as_deref().unwrap_or_default()
        );
    } else {
        println!("kept");
    }
    Ok(0)
}

fn run_preview(args: &PreviewArgs) -> Result<u8> {
    let draft: DropRuleDraft = read_json(&args.rule, "drop rule")?;
    let context: DropContext = read_json(&args.context, "drop context")?;
    draft.validate().context("drop rule is invalid")?;

    if preview_drop_rule(&draft, &context) {
        println!("match");
    } else {
        println!("no match");
    }
    Ok(0)
}
