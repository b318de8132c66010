//! Command implementations behind the `inspections` subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chain::artifacts::{CLEANED_DATA, failed_rows};
use chain::io::dir_sink::DirSink;
use chain::{AssertionChain, StorageSink, apply, explore, validate};
use chrono::Utc;
use tracing::info;

use crate::assertions::build_chain;
use crate::config::InspectionsConfig;
use crate::source::load_table;
use crate::summary::{Mode, RunSummary, StepSummary, SummaryInput, write_summary};

/// Print the chain in evaluation order.
pub fn cmd_list(config: &InspectionsConfig) -> Result<()> {
    let chain = build_chain(config)?;
    for line in list_lines(&chain) {
        println!("{line}");
    }
    Ok(())
}

fn list_lines(chain: &AssertionChain) -> Vec<String> {
    chain
        .iter()
        .enumerate()
        .map(|(position, assertion)| {
            format!("{position} {} {}", assertion.operation(), assertion.name())
        })
        .collect()
}

/// Report each assertion's failures and write them to `explore_dir`.
pub fn cmd_explore(config: &InspectionsConfig) -> Result<()> {
    let chain = build_chain(config)?;
    let started_at = Utc::now();
    let table = load_table(&config.input)?;
    let rows_in = table.len();

    let mut sink = DirSink::new(&config.explore_dir, config.format);
    sink.reset()?;
    let paths = sink.clone();
    let mut steps = Vec::with_capacity(chain.len());

    let result = explore(&chain, table, &mut sink, |report| {
        println!(
            "Assertion {}: {}: {} rows fail ({:.2}%). Failed rows saved as {}",
            report.position,
            report.assertion,
            report.count,
            report.percent(),
            paths.path_for(&failed_rows(report.position)).display()
        );
        steps.push(StepSummary::from(report));
    })?;

    let summary = RunSummary::new(SummaryInput {
        mode: Mode::Explore,
        input: &config.input,
        rows_in,
        rows_out: result.len(),
        steps,
        started_at,
        finished_at: Utc::now(),
    })?;
    write_summary(sink.dir(), &summary)?;
    info!(rows_in, rows_out = result.len(), "explore finished");
    Ok(())
}

/// Clean the input and write `cleaned_data` to `clean_dir`.
pub fn cmd_apply(config: &InspectionsConfig) -> Result<()> {
    let chain = build_chain(config)?;
    let started_at = Utc::now();
    let table = load_table(&config.input)?;
    let rows_in = table.len();

    let mut sink = DirSink::new(&config.clean_dir, config.format).with_index(false);
    sink.reset()?;
    let cleaned = apply(&chain, table, &mut sink)?;
    println!(
        "Cleaned {} of {} rows into {}",
        cleaned.len(),
        rows_in,
        sink.path_for(CLEANED_DATA).display()
    );

    let steps = chain
        .iter()
        .enumerate()
        .map(|(position, assertion)| StepSummary::planned(position, assertion))
        .collect();
    let summary = RunSummary::new(SummaryInput {
        mode: Mode::Apply,
        input: &config.input,
        rows_in,
        rows_out: cleaned.len(),
        steps,
        started_at,
        finished_at: Utc::now(),
    })?;
    write_summary(sink.dir(), &summary)?;
    Ok(())
}

/// Check that a table satisfies the chain.
///
/// Without `input`, checks the `cleaned_data` written by the last apply.
pub fn cmd_validate(config: &InspectionsConfig, input: Option<&Path>) -> Result<()> {
    let chain = build_chain(config)?;
    let path = input.map_or_else(|| cleaned_data_path(config), Path::to_path_buf);
    let table = load_table(&path)?;
    validate(&chain, &table).with_context(|| format!("validate {}", path.display()))?;
    println!(
        "{}: {} rows satisfy all {} assertions",
        path.display(),
        table.len(),
        chain.len()
    );
    Ok(())
}

fn cleaned_data_path(config: &InspectionsConfig) -> PathBuf {
    DirSink::new(&config.clean_dir, config.format).path_for(CLEANED_DATA)
}
