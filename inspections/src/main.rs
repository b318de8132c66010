//! Chicago Food Inspections cleaner.
//!
//! Declares one assertion chain over the inspections table and runs it as
//! `explore` (report failures per assertion), `apply` (write the cleaned
//! table) or `validate` (check a table without changing it).

mod assertions;
mod cli;
mod config;
mod source;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use chain::io::dir_sink::ArtifactFormat;
use chain::{ChainError, exit_codes};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::config::{ConfigOverrides, DEFAULT_CONFIG_PATH, apply_overrides, load_config};

#[derive(Parser)]
#[command(
    name = "inspections",
    version,
    about = "Assertion-chain cleaning of the Chicago Food Inspections data"
)]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Raw input table (CSV or JSON).
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[arg(long, global = true)]
    explore_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    clean_dir: Option<PathBuf>,

    /// Encoding of written tables.
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// More diagnostics on stderr (`-v` info, `-vv` debug); `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the assertion chain in evaluation order.
    List,
    /// Report and save the rows each assertion fails on.
    Explore,
    /// Clean the input and save the result.
    Apply,
    /// Check a table against the chain (defaults to the last apply output).
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ArtifactFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ArtifactFormat::Csv,
            FormatArg::Json => ArtifactFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    chain::logging::init(cli.verbose);
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        input: cli.input.clone(),
        explore_dir: cli.explore_dir,
        clean_dir: cli.clean_dir,
        format: cli.format.map(ArtifactFormat::from),
    };
    let config = apply_overrides(load_config(&cli.config)?, &overrides)?;
    match cli.command {
        Command::List => cli::cmd_list(&config),
        Command::Explore => cli::cmd_explore(&config),
        Command::Apply => cli::cmd_apply(&config),
        Command::Validate => cli::cmd_validate(&config, cli.input.as_deref()),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ChainError>() {
        Some(chain_err) if chain_err.is_violation() => exit_codes::NOT_CLEAN,
        _ => exit_codes::INVALID,
    }
}
