//! Directory-backed storage sink.
//!
//! Each artifact becomes one file named after its identifier. `reset` clears
//! and recreates the directory, so a pass never mixes with stale output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::table::Table;
use crate::io::csv::{index_header, render_table};
use crate::io::sink::StorageSink;

/// On-disk encoding of artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Csv,
    /// Pretty-printed JSON array of row objects.
    Json,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Csv => "csv",
            ArtifactFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
    format: ArtifactFormat,
    include_index: bool,
}

impl DirSink {
    /// Sink writing into `dir`; rows carry their source index by default.
    pub fn new(dir: impl Into<PathBuf>, format: ArtifactFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            include_index: true,
        }
    }

    /// Toggle the leading source-index column (CSV) or field (JSON).
    pub fn with_index(mut self, include_index: bool) -> Self {
        self.include_index = include_index;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// File that holds `artifact`.
    pub fn path_for(&self, artifact: &str) -> PathBuf {
        self.dir
            .join(format!("{artifact}.{}", self.format.extension()))
    }

    fn render(&self, table: &Table) -> Result<String> {
        match self.format {
            ArtifactFormat::Csv => Ok(render_table(table, self.include_index)),
            ArtifactFormat::Json => {
                let index = self.include_index.then(|| index_header(table));
                let mut records = Vec::with_capacity(table.len());
                for (position, row) in table.iter() {
                    let mut record = serde_json::to_value(row).context("serialize row")?;
                    if let (Some(header), serde_json::Value::Object(fields)) =
                        (&index, &mut record)
                    {
                        fields.insert(header.clone(), position.into());
                    }
                    records.push(record);
                }
                let mut buf = serde_json::to_string_pretty(&records).context("serialize rows")?;
                buf.push('\n');
                Ok(buf)
            }
        }
    }
}

impl StorageSink for DirSink {
    fn reset(&mut self) -> Result<()> {
        if self.dir.exists() {
            debug!(dir = %self.dir.display(), "clearing output dir");
            fs::remove_dir_all(&self.dir)
                .with_context(|| format!("remove output dir {}", self.dir.display()))?;
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir {}", self.dir.display()))
    }

    fn write(&mut self, artifact: &str, table: &Table) -> Result<()> {
        validate_artifact_name(artifact)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir {}", self.dir.display()))?;
        let path = self.path_for(artifact);
        let contents = self.render(table)?;
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), rows = table.len(), "artifact written");
        Ok(())
    }
}

fn validate_artifact_name(artifact: &str) -> Result<()> {
    if artifact.is_empty()
        || artifact == "."
        || artifact == ".."
        || artifact.contains(['/', '\\'])
    {
        bail!("invalid artifact name '{artifact}'");
    }
    Ok(())
}
