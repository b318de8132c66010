//! Validate mode: read-only post-condition check of a table.

use tracing::{debug, info, instrument};

use crate::core::engine::evaluate_mask;
use crate::core::registry::AssertionChain;
use crate::core::table::Table;
use crate::error::ChainError;

/// Check that `table` already satisfies every assertion.
///
/// Assertions are evaluated in order against the table as passed in. The
/// first assertion with violations stops the check with
/// [`ChainError::AssertionViolation`]; later assertions are not evaluated.
#[instrument(skip_all, fields(assertions = chain.len(), rows = table.len()))]
pub fn validate(chain: &AssertionChain, table: &Table) -> Result<(), ChainError> {
    for (position, assertion) in chain.iter().enumerate() {
        let valid = evaluate_mask(table, assertion)?;
        let count = valid.iter().filter(|keep| !**keep).count();
        if count > 0 {
            info!(position, assertion = assertion.name(), count, "assertion violated");
            return Err(ChainError::AssertionViolation {
                assertion: assertion.name().to_string(),
                count,
                total: table.len(),
            });
        }
        debug!(position, assertion = assertion.name(), "assertion holds");
    }
    Ok(())
}
