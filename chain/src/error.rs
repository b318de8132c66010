//! Failure taxonomy shared by registration, the engine and the execution modes.

/// Errors raised while building or running an assertion chain.
///
/// Every variant aborts the current pass; a failed pass is restarted from the
/// original table. [`ChainError::AssertionViolation`] is the only expected
/// failure: it means the dataset is not clean.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("invalid assertion '{assertion}': {reason}")]
    Configuration { assertion: String, reason: String },

    #[error("predicate for '{assertion}' failed: {reason}")]
    Predicate { assertion: String, reason: String },

    #[error("resolver for '{assertion}' failed: {reason}")]
    Resolution { assertion: String, reason: String },

    #[error("assertion '{assertion}' violated by {count} of {total} rows")]
    AssertionViolation {
        assertion: String,
        count: usize,
        total: usize,
    },

    #[error("storage write of '{artifact}' failed: {reason}")]
    Storage { artifact: String, reason: String },
}

impl ChainError {
    pub(crate) fn configuration(assertion: &str, reason: impl Into<String>) -> Self {
        ChainError::Configuration {
            assertion: assertion.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn predicate(assertion: &str, reason: impl Into<String>) -> Self {
        ChainError::Predicate {
            assertion: assertion.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(assertion: &str, reason: impl Into<String>) -> Self {
        ChainError::Resolution {
            assertion: assertion.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a sink failure, keeping the full `anyhow` context chain.
    pub(crate) fn storage(artifact: &str, err: &anyhow::Error) -> Self {
        ChainError::Storage {
            artifact: artifact.to_string(),
            reason: format!("{err:#}"),
        }
    }

    /// True for the "dataset is not clean" outcome of validation.
    pub fn is_violation(&self) -> bool {
        matches!(self, ChainError::AssertionViolation { .. })
    }
}
