//! Assertion records: a named row predicate paired with a resolution policy.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::table::{Mask, Row, Table};
use crate::error::ChainError;

/// What to do with rows that fail a predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Discard violating rows.
    #[default]
    Drop,
    /// Rewrite violating rows with the assertion's resolver.
    Apply,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Drop => "drop",
            Operation::Apply => "apply",
        }
    }

    /// Parse an operation name supplied as text for `assertion`.
    pub fn parse(assertion: &str, text: &str) -> Result<Self, ChainError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Operation::Drop),
            "apply" => Ok(Operation::Apply),
            other => Err(ChainError::configuration(
                assertion,
                format!("unknown operation '{other}' (expected 'drop' or 'apply')"),
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes a validity mask with one entry per row of its input.
pub trait Predicate {
    fn evaluate(&self, table: &Table) -> Result<Mask>;
}

impl<F> Predicate for F
where
    F: Fn(&Table) -> Result<Mask>,
{
    fn evaluate(&self, table: &Table) -> Result<Mask> {
        self(table)
    }
}

/// Repairs a table holding only violating rows.
///
/// The output must keep one row per input row, in the same order.
pub trait Resolver {
    fn resolve(&self, invalid: Table) -> Result<Table>;
}

impl<F> Resolver for F
where
    F: Fn(Table) -> Result<Table>,
{
    fn resolve(&self, invalid: Table) -> Result<Table> {
        self(invalid)
    }
}

/// Predicate evaluated independently on every row. See [`rows`].
pub struct RowPredicate<F>(F);

/// Lift a row test into a [`Predicate`].
pub fn rows<F: Fn(&Row) -> bool>(test: F) -> RowPredicate<F> {
    RowPredicate(test)
}

impl<F: Fn(&Row) -> bool> Predicate for RowPredicate<F> {
    fn evaluate(&self, table: &Table) -> Result<Mask> {
        Ok(table.rows().iter().map(&self.0).collect())
    }
}

/// Resolver rewriting every row independently. See [`each_row`].
pub struct RowResolver<F>(F);

/// Lift a row rewrite into a [`Resolver`].
pub fn each_row<F: Fn(Row) -> Row>(rewrite: F) -> RowResolver<F> {
    RowResolver(rewrite)
}

impl<F: Fn(Row) -> Row> Resolver for RowResolver<F> {
    fn resolve(&self, invalid: Table) -> Result<Table> {
        Ok(invalid.map_rows(&self.0))
    }
}

enum Policy {
    Drop,
    Apply(Box<dyn Resolver>),
}

/// One immutable rule of a chain.
pub struct Assertion {
    name: String,
    predicate: Box<dyn Predicate>,
    policy: Policy,
}

impl Assertion {
    /// Validate registration arguments and build the record.
    ///
    /// A blank name or `Apply` without a resolver is rejected. A resolver
    /// given with `Drop` is discarded.
    pub(crate) fn new(
        name: String,
        predicate: Box<dyn Predicate>,
        operation: Operation,
        resolver: Option<Box<dyn Resolver>>,
    ) -> Result<Self, ChainError> {
        if name.trim().is_empty() {
            return Err(ChainError::configuration(
                &name,
                "assertion name must not be empty",
            ));
        }
        let policy = match (operation, resolver) {
            (Operation::Drop, None) => Policy::Drop,
            (Operation::Drop, Some(_)) => {
                debug!(assertion = %name, "ignoring resolver for drop assertion");
                Policy::Drop
            }
            (Operation::Apply, Some(resolver)) => Policy::Apply(resolver),
            (Operation::Apply, None) => {
                return Err(ChainError::configuration(
                    &name,
                    "operation 'apply' requires a resolver",
                ));
            }
        };
        Ok(Self {
            name,
            predicate,
            policy,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self) -> Operation {
        match self.policy {
            Policy::Drop => Operation::Drop,
            Policy::Apply(_) => Operation::Apply,
        }
    }

    pub(crate) fn predicate(&self) -> &dyn Predicate {
        self.predicate.as_ref()
    }

    /// Present exactly when the operation is `Apply`.
    pub(crate) fn resolver(&self) -> Option<&dyn Resolver> {
        match &self.policy {
            Policy::Drop => None,
            Policy::Apply(resolver) => Some(resolver.as_ref()),
        }
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .field("operation", &self.operation())
            .finish_non_exhaustive()
    }
}
