//! Apply mode: the cleaning pass.

use tracing::{debug, info, instrument};

use crate::artifacts::{CLEANED_DATA, persist};
use crate::core::engine::resolve;
use crate::core::registry::AssertionChain;
use crate::core::table::Table;
use crate::error::ChainError;
use crate::io::sink::StorageSink;

/// Resolve every assertion in order without reporting or persisting.
pub fn resolve_chain(chain: &AssertionChain, table: Table) -> Result<Table, ChainError> {
    let mut current = table;
    for (position, assertion) in chain.iter().enumerate() {
        let rows_before = current.len();
        current = resolve(current, assertion)?;
        debug!(
            position,
            assertion = assertion.name(),
            rows_before,
            rows_after = current.len(),
            "assertion applied"
        );
    }
    Ok(current)
}

/// Clean `table` with the chain and persist the result as the cleaned data.
#[instrument(skip_all, fields(assertions = chain.len(), rows = table.len()))]
pub fn apply<S>(chain: &AssertionChain, table: Table, sink: &mut S) -> Result<Table, ChainError>
where
    S: StorageSink + ?Sized,
{
    let cleaned = resolve_chain(chain, table)?;
    persist(sink, CLEANED_DATA, &cleaned)?;
    info!(rows = cleaned.len(), "apply complete");
    Ok(cleaned)
}
