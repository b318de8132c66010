//! Storage sink abstraction for chain artifacts.
//!
//! Execution modes only ever talk to a [`StorageSink`]. The directory-backed
//! implementation lives in [`crate::io::dir_sink`]; [`MemorySink`] keeps
//! artifacts in memory for callers that post-process them and for tests.

use anyhow::Result;
use tracing::debug;

use crate::core::table::Table;

/// Destination for tables produced by an execution mode.
pub trait StorageSink {
    /// Open the sink for a fresh pass, discarding artifacts of earlier passes.
    ///
    /// Callers invoke this before running a mode; modes never call it.
    fn reset(&mut self) -> Result<()>;

    /// Persist `table` under the logical identifier `artifact`.
    fn write(&mut self, artifact: &str, table: &Table) -> Result<()>;
}

/// Sink that records every write in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    artifacts: Vec<(String, Table)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact identifiers in write order.
    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Most recent table written under `artifact`.
    pub fn get(&self, artifact: &str) -> Option<&Table> {
        self.artifacts
            .iter()
            .rev()
            .find(|(name, _)| name == artifact)
            .map(|(_, table)| table)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl StorageSink for MemorySink {
    fn reset(&mut self) -> Result<()> {
        self.artifacts.clear();
        Ok(())
    }

    fn write(&mut self, artifact: &str, table: &Table) -> Result<()> {
        debug!(artifact, rows = table.len(), "memory sink write");
        self.artifacts.push((artifact.to_string(), table.clone()));
        Ok(())
    }
}
