#![deny(unsafe_code)]
//! CLI binary for the filter-solver.
//!
//! Subcommands:
//! - `solve <hex>...` — fit a CSS filter chain to each color
//! - `apply <filter>` — render a filter chain on black and print the color
//! - `schema` — print the solver configuration keys and defaults

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use filter_solver_core::{FilterChain, Rgb, Solver, SolverConfig, Xorshift64};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "filter-solver",
    about = "Find CSS filter chains that recolor black into a target color"
)]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log search progress to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a filter chain to one or more hex colors.
    Solve {
        /// Target colors as #rgb or #rrggbb.
        #[arg(required = true)]
        colors: Vec<String>,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Solver configuration overrides as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Apply a filter chain to black and print the resulting color.
    Apply {
        /// CSS filter value, e.g. "invert(100%) sepia(50%)".
        filter: String,
    },
    /// Print the solver configuration schema.
    Schema,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Solve {
            colors,
            seed,
            params,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let config = SolverConfig::from_json(&params);
            config.validate()?;

            // Parse every color up front so a typo fails before any search runs.
            let targets = colors
                .iter()
                .map(|hex| Rgb::from_hex(hex))
                .collect::<Result<Vec<_>, _>>()?;

            let mut results = Vec::with_capacity(targets.len());
            for (hex, target) in colors.iter().zip(targets) {
                let mut solver = Solver::new(target, config.clone())?;
                let solution = solver.solve(&mut Xorshift64::new(seed));
                if cli.json {
                    results.push(serde_json::json!({
                        "input": hex,
                        "target": target,
                        "filter": solution.filter,
                        "values": solution.values,
                        "loss": solution.loss,
                        "rendered": solution.rendered(),
                    }));
                } else {
                    println!("{hex}");
                    println!("  filter: {}", solution.filter);
                    println!(
                        "  loss:   {:.3} (rendered {})",
                        solution.loss,
                        solution.rendered()
                    );
                }
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        Command::Apply { filter } => {
            let chain: FilterChain = filter.parse()?;
            let color = chain.render_from_black();
            if cli.json {
                let info = serde_json::json!({
                    "filter": chain,
                    "hex": color,
                    "rgb": color.to_string(),
                    "hsl": color.to_hsl(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} {color}", color.to_hex());
            }
        }
        Command::Schema => {
            let schema = SolverConfig::param_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        tracing::debug!(exit_code = e.exit_code(), "command failed");
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
