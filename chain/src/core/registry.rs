//! Append-only, ordered registry of assertions.

use std::collections::HashSet;

use tracing::warn;

use crate::core::assertion::{Assertion, Operation, Predicate, Resolver};
use crate::error::ChainError;

/// Ordered collection of assertions applied cumulatively.
///
/// Registration order is evaluation order: later assertions may rely on
/// earlier ones having already repaired the data.
#[derive(Debug, Default)]
pub struct AssertionChain {
    assertions: Vec<Assertion>,
}

impl AssertionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assertion.
    ///
    /// Fails with [`ChainError::Configuration`] for a blank name or for
    /// `Apply` without a resolver; on failure the chain is unchanged.
    /// Duplicate names are accepted but logged.
    pub fn register<P>(
        &mut self,
        name: impl Into<String>,
        predicate: P,
        operation: Operation,
        resolver: Option<Box<dyn Resolver>>,
    ) -> Result<&mut Self, ChainError>
    where
        P: Predicate + 'static,
    {
        self.register_boxed(name, Box::new(predicate), operation, resolver)
    }

    /// [`AssertionChain::register`] for an already boxed predicate.
    pub fn register_boxed(
        &mut self,
        name: impl Into<String>,
        predicate: Box<dyn Predicate>,
        operation: Operation,
        resolver: Option<Box<dyn Resolver>>,
    ) -> Result<&mut Self, ChainError> {
        let assertion = Assertion::new(name.into(), predicate, operation, resolver)?;
        if self.assertions.iter().any(|a| a.name() == assertion.name()) {
            warn!(assertion = %assertion.name(), "duplicate assertion name in chain");
        }
        self.assertions.push(assertion);
        Ok(self)
    }

    /// Register an assertion that drops violating rows.
    pub fn drop_rows<P>(
        &mut self,
        name: impl Into<String>,
        predicate: P,
    ) -> Result<&mut Self, ChainError>
    where
        P: Predicate + 'static,
    {
        self.register(name, predicate, Operation::Drop, None)
    }

    /// Register an assertion that repairs violating rows with `resolver`.
    pub fn apply_with<P, R>(
        &mut self,
        name: impl Into<String>,
        predicate: P,
        resolver: R,
    ) -> Result<&mut Self, ChainError>
    where
        P: Predicate + 'static,
        R: Resolver + 'static,
    {
        self.register(name, predicate, Operation::Apply, Some(Box::new(resolver)))
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Assertions in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assertion> {
        self.assertions.iter()
    }

    /// Assertion names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.assertions.iter().map(Assertion::name).collect()
    }

    /// Names registered more than once, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for assertion in &self.assertions {
            let name = assertion.name();
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }
}

impl<'a> IntoIterator for &'a AssertionChain {
    type Item = &'a Assertion;
    type IntoIter = std::slice::Iter<'a, Assertion>;

    fn into_iter(self) -> Self::IntoIter {
        self.assertions.iter()
    }
}
