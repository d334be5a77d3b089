//! rgate - security regression gate CLI.
//!
//! - `rgate evaluate` - turn finding counts into a PASS/WARN/BLOCK verdict
//! - `rgate drop-rules` - check or preview finding suppression rules
//! - `rgate roles` - validate attacker/victim account coverage
//! - `rgate run` - replay a recorded batch through the full gate run
//!
//! `evaluate` and `run` exit with the gate's exit code (0 pass/warn,
//! 1 block, 3 orchestration failure). Invalid input exits 3.

#![forbid(unsafe_code)]

mod drop_rules;
mod evaluate;
mod input;
mod roles;
mod run;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rgate_core::GateExitCode;
use rgate_runner::GateConfig;

/// Security regression gate.
#[derive(Parser)]
#[command(name = "rgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate finding counts against a gate policy.
    ///
    /// Example: rgate evaluate --test-findings 3 --policy policy.json
    Evaluate(evaluate::EvaluateArgs),

    /// Drop-rule tooling.
    DropRules(drop_rules::DropRulesArgs),

    /// Mutation-role tooling.
    Roles(roles::RolesArgs),

    /// Replay a recorded execution plan through the gate.
    Run(run::RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Run(args) => match args.load_config() {
            Ok(config) => config,
            Err(err) => return fail(&err),
        },
        _ => GateConfig::default(),
    };

    // Logs go to stderr so stdout stays clean for JSON output.
    if let Err(err) = rgate_telemetry::init_logging(&config.telemetry) {
        eprintln!("warning: {err}");
    }

    let outcome = match &cli.command {
        Commands::Evaluate(args) => evaluate::run(args),
        Commands::DropRules(args) => drop_rules::run(args),
        Commands::Roles(args) => roles::run(args),
        Commands::Run(args) => run::run(args, &config),
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(err) => fail(&err),
    }
}

fn fail(err: &anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    ExitCode::from(GateExitCode::OrchestrationFailure.code())
}
