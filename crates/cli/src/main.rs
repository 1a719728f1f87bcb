//! Command Line Interface for the CLMM vault engine.
//!
//! Replays JSON scenarios against a simulated market and prints the state of
//! the vault along the way.

mod report;
mod scenario;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use report::print_report;
use scenario::{Runner, Scenario};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clmm-vault")]
#[command(about = "Concentrated liquidity vault scenario runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file
    Run {
        /// Scenario JSON file (defaults to VAULT_SCENARIO)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Print a report after every step
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Print a starter scenario
    Template,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, verbose } => {
            let path = match scenario {
                Some(path) => path,
                None => env::var("VAULT_SCENARIO")
                    .map(PathBuf::from)
                    .map_err(|_| anyhow!("pass --scenario or set VAULT_SCENARIO"))?,
            };
            let scenario = Scenario::load(&path)?;

            println!(
                "🚀 Replaying {} steps from {}...",
                scenario.steps.len(),
                path.display()
            );
            let mut runner = Runner::new(&scenario)?;
            for (index, step) in scenario.steps.iter().enumerate() {
                let wants_report = runner
                    .apply(step)
                    .with_context(|| format!("step {index} ({step:?}) failed"))?;
                if wants_report || verbose {
                    print_report(&runner)?;
                }
            }
            println!("✅ Scenario complete");
        }
        Commands::Template => {
            let json = serde_json::to_string_pretty(&Scenario::template())?;
            println!("{json}");
        }
    }

    Ok(())
}
