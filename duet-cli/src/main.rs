//! # duet CLI
//!
//! Runs two-party conversation scenarios through the engine.
//!
//! Usage:
//!   duet run <scenario.json> [--config engine.json] [--max-rounds N]
//!   duet config [--config engine.json]
//!
//! Examples:
//!   duet run demos/cat_and_mouse.json
//!   duet run demos/remote_producer.json --config demos/engine.json -v
//!   RUST_LOG=duet_engine=debug duet run demos/cat_and_mouse.json -q
//!
//! Exit status is 0 when the conversation terminated, 2 when it ran out of
//! rounds and 1 on error.

mod scenario;

use clap::{Parser, Subcommand};
use duet_chat::{error as chat_error, Message};
use duet_engine::{ConversationEngine, ConversationOutcome, EngineConfig, RunState};
use duet_error::Result;
use scenario::Scenario;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet")]
#[command(author, version, about = "duet - bounded two-party conversations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output (debug logs and the stop reason)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show the outcome
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        /// Path to the scenario JSON file
        #[arg(required = true)]
        scenario: PathBuf,

        /// Override the round cap from the config and scenario
        #[arg(short, long)]
        max_rounds: Option<usize>,
    },
    /// Print the effective engine configuration
    Config,
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path),
        None => Ok(EngineConfig::default()),
    }
}

fn print_message(round: usize, message: &Message) {
    if round == 0 {
        println!("--- seed ---");
    } else {
        println!("--- round {} ---", round);
    }
    println!("{}\n", message);
}

fn print_outcome(outcome: &ConversationOutcome, verbose: bool) {
    println!("=== {} after {} rounds ===", outcome.state, outcome.rounds);
    if let Some(artifact) = outcome.artifact() {
        println!("{}", artifact);
    }
    if verbose {
        match serde_json::to_string(&outcome.stop_reason) {
            Ok(reason) => println!("stop: {}", reason),
            Err(e) => tracing::warn!(error = %e, "failed to encode stop reason"),
        }
    }
}

async fn run_scenario(
    path: &Path,
    mut config: EngineConfig,
    max_rounds: Option<usize>,
    verbose: bool,
    quiet: bool,
) -> Result<RunState> {
    let scenario = Scenario::from_file(path)?;
    if let Some(n) = max_rounds.or(scenario.max_rounds) {
        config.max_rounds = n;
    }

    let initiator = scenario.initiator.build(&config.markers)?;
    let responder = scenario.responder.build(&config.markers)?;

    let mut engine = ConversationEngine::new(config)?;
    if !quiet {
        println!("Running scenario: {}", scenario.title());
        println!(
            "{} <-> {} (max {} rounds)\n",
            scenario.initiator.name,
            scenario.responder.name,
            engine.config().max_rounds
        );
        engine = engine.with_observer(print_message);
    }

    match engine.converse(&initiator, &responder, scenario.seed_message()).await {
        Ok(outcome) => {
            print_outcome(&outcome, verbose);
            Ok(outcome.state)
        }
        Err(err) => {
            eprintln!("\n=== FAILED after {} messages ===", err.conversation().len());
            Err(err.into())
        }
    }
}

fn show_config(config: &EngineConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).map_err(|e| {
        chat_error::serialization_failed("failed to encode engine configuration")
            .with_operation("cli::config")
            .set_source(e)
    })?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Config => show_config(&config).map(|_| ExitCode::SUCCESS),
            Commands::Run {
                scenario,
                max_rounds,
            } => run_scenario(&scenario, config, max_rounds, cli.verbose, cli.quiet)
                .await
                .map(|state| match state {
                    RunState::Terminated => ExitCode::SUCCESS,
                    _ => ExitCode::from(2),
                }),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if cli.verbose {
                eprintln!("Error: {:?}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
