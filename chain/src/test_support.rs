//! Test-only helpers for building tables, chains and sinks.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::core::assertion::{Predicate, rows};
use crate::core::registry::AssertionChain;
use crate::core::table::{Mask, Table, Value, field};
use crate::io::sink::{MemorySink, StorageSink};

/// Single-column table of `license` values; `None` becomes null.
pub fn license_table(values: &[Option<i64>]) -> Table {
    Table::from_records(["license"], values.iter().map(|value| [Value::from(*value)]))
}

/// Rows whose `license` cell is not null.
pub fn license_not_null() -> impl Predicate {
    rows(|row| !field(row, "license").is_null())
}

/// Rows whose `license` cell is a positive number.
pub fn license_positive() -> impl Predicate {
    rows(|row| field(row, "license").as_f64().is_some_and(|v| v > 0.0))
}

/// `[license not null (drop), license > 0 (drop)]`.
pub fn license_chain() -> AssertionChain {
    let mut chain = AssertionChain::new();
    chain
        .drop_rows("license not null", license_not_null())
        .expect("register license not null")
        .drop_rows("license > 0", license_positive())
        .expect("register license > 0");
    chain
}

/// Wrap `predicate` so every evaluation bumps `calls`.
pub fn counted<P: Predicate>(calls: Rc<Cell<usize>>, predicate: P) -> impl Predicate {
    move |table: &Table| -> Result<Mask> {
        calls.set(calls.get() + 1);
        predicate.evaluate(table)
    }
}

/// Scratch directory removed on drop.
pub fn scratch_dir() -> Result<tempfile::TempDir> {
    Ok(tempfile::tempdir()?)
}

/// Memory sink that fails when asked to write one artifact.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub fail_on: String,
    pub inner: MemorySink,
}

impl FailingSink {
    pub fn new(fail_on: impl Into<String>) -> Self {
        Self {
            fail_on: fail_on.into(),
            inner: MemorySink::new(),
        }
    }
}

impl StorageSink for FailingSink {
    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    fn write(&mut self, artifact: &str, table: &Table) -> Result<()> {
        if artifact == self.fail_on {
            bail!("disk full");
        }
        self.inner.write(artifact, table)
    }
}
