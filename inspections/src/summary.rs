//! Run summaries persisted to `run.json` next to the artifacts.
//!
//! The summary records what was cleaned and how, so an output directory can
//! be traced back to its exact input.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chain::{Assertion, FailureReport, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File name of the summary inside an output directory.
pub const SUMMARY_FILE: &str = "run.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Explore,
    Apply,
}

/// Per-assertion line of a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub position: usize,
    pub assertion: String,
    pub operation: Operation,
    /// Violating rows; recorded by explore only.
    pub failed: Option<usize>,
    pub failed_percent: Option<f64>,
}

impl StepSummary {
    /// Step that ran without counting its violations.
    pub fn planned(position: usize, assertion: &Assertion) -> Self {
        Self {
            position,
            assertion: assertion.name().to_string(),
            operation: assertion.operation(),
            failed: None,
            failed_percent: None,
        }
    }
}

impl From<&FailureReport> for StepSummary {
    fn from(report: &FailureReport) -> Self {
        Self {
            position: report.position,
            assertion: report.assertion.clone(),
            operation: report.operation,
            failed: Some(report.count),
            failed_percent: Some(report.percent()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub input: String,
    /// SHA-256 of the input file.
    pub input_sha256: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub steps: Vec<StepSummary>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
}

/// Inputs for [`RunSummary::new`].
#[derive(Debug)]
pub struct SummaryInput<'a> {
    pub mode: Mode,
    pub input: &'a Path,
    pub rows_in: usize,
    pub rows_out: usize,
    pub steps: Vec<StepSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(input: SummaryInput<'_>) -> Result<Self> {
        let duration = input.finished_at - input.started_at;
        Ok(Self {
            mode: input.mode,
            input: input.input.display().to_string(),
            input_sha256: file_sha256(input.input)?,
            rows_in: input.rows_in,
            rows_out: input.rows_out,
            steps: input.steps,
            start_time: input.started_at.to_rfc3339(),
            end_time: input.finished_at.to_rfc3339(),
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        })
    }
}

/// Serialize `summary` to `<dir>/run.json`, pretty-printed with trailing newline.
pub fn write_summary(dir: &Path, summary: &RunSummary) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(SUMMARY_FILE);
    let mut buf = serde_json::to_string_pretty(summary).context("serialize summary")?;
    buf.push('\n');
    fs::write(&path, buf).with_context(|| format!("write {}", path.display()))
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}
