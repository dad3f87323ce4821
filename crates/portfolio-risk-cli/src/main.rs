mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::{PerformanceArgs, RiskArgs};

/// Portfolio risk analytics
#[derive(Parser)]
#[command(
    name = "pra",
    version,
    about = "Portfolio Value-at-Risk and performance calculations",
    long_about = "A CLI for assessing single-day portfolio Value-at-Risk with \
                  decimal precision. Computes parametric VaR, classifies the \
                  estimate into a risk tier, and reports portfolio performance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess single-day portfolio Value-at-Risk
    Risk(RiskArgs),
    /// Calculate portfolio performance (market value, cost basis, PnL)
    Performance(PerformanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Risk(args) => commands::run_risk(args),
        Commands::Performance(args) => commands::run_performance(args),
        Commands::Version => {
            println!("pra {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
