//! Per-assertion failure reports produced while exploring a chain.

use crate::core::assertion::{Assertion, Operation};
use crate::core::engine::Violations;
use crate::core::table::Table;

/// What one assertion found in the table it was evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    /// Position of the assertion in its chain.
    pub position: usize,
    pub assertion: String,
    pub operation: Operation,
    /// Number of violating rows.
    pub count: usize,
    /// Row count of the table at the time of evaluation.
    pub total: usize,
    pub rows: Table,
}

impl FailureReport {
    pub fn new(position: usize, assertion: &Assertion, violations: &Violations) -> Self {
        Self {
            position,
            assertion: assertion.name().to_string(),
            operation: assertion.operation(),
            count: violations.count(),
            total: violations.valid.len(),
            rows: violations.rows.clone(),
        }
    }

    /// Share of violating rows, in percent. An empty table reports 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.count as f64 / self.total as f64
    }
}
