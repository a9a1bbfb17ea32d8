mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::case::{BreakEvenArgs, CalculateArgs};
use commands::scenarios::{CompareArgs, ScenariosArgs, SensitivityArgs, TornadoArgs};

/// Investment case calculations
#[derive(Parser)]
#[command(
    name = "bizcase",
    version,
    about = "Investment case calculations: ROI, NPV, IRR, payback, break-even and sensitivity",
    long_about = "A CLI for evaluating an investment case from its economics (investment, \
                  discount rate, revenue, growth, costs, duration) with decimal precision. \
                  Supports single-case metrics, expected/best/worst scenarios, what-if \
                  comparison, break-even, one-way sensitivity and tornado ranking."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate ROI, NPV, IRR and payback for one case
    Calculate(CalculateArgs),
    /// Evaluate expected, best and worst revenue cases
    Scenarios(ScenariosArgs),
    /// Compare two what-if adjustments of one case
    Compare(CompareArgs),
    /// Find the month cumulative revenue covers cost plus investment
    BreakEven(BreakEvenArgs),
    /// One-way sensitivity of NPV and ROI
    Sensitivity(SensitivityArgs),
    /// Rank inputs by their ±30% impact
    Tornado(TornadoArgs),
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

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::case::run_calculate(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Compare(args) => commands::scenarios::run_compare(args),
        Commands::BreakEven(args) => commands::case::run_break_even(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::Tornado(args) => commands::scenarios::run_tornado(args),
        Commands::Version => {
            println!("bizcase {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "writing output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
