//! Logical identifiers of the artifacts written by the execution modes.

use crate::core::registry::AssertionChain;
use crate::core::table::{Table, Value};
use crate::error::ChainError;
use crate::io::sink::StorageSink;

/// Assertion names in chain order, written by explore.
pub const CHAIN_MANIFEST: &str = "assertion_chain";
/// Table left after an explore pass resolved every assertion.
pub const EXPLORATION_RESULT: &str = "exploration_result";
/// Table produced by an apply pass.
pub const CLEANED_DATA: &str = "cleaned_data";

/// Violating rows of the assertion at `position`, written by explore.
pub fn failed_rows(position: usize) -> String {
    format!("assertion{position}_failed_rows")
}

/// One row per assertion: `position`, `assertion`, `operation`.
pub fn manifest_table(chain: &AssertionChain) -> Table {
    Table::from_records(
        ["position", "assertion", "operation"],
        chain.iter().enumerate().map(|(position, assertion)| {
            [
                Value::Int(position as i64),
                Value::from(assertion.name()),
                Value::from(assertion.operation().as_str()),
            ]
        }),
    )
}

pub(crate) fn persist<S>(sink: &mut S, artifact: &str, table: &Table) -> Result<(), ChainError>
where
    S: StorageSink + ?Sized,
{
    sink.write(artifact, table)
        .map_err(|err| ChainError::storage(artifact, &err))
}
