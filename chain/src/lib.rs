//! Declarative, ordered assertion chains for cleaning tabular data.
//!
//! A chain is a sequence of named row predicates, each paired with a
//! resolution policy (drop or repair the violating rows). One declaration
//! runs in three modes:
//!
//! - **[`explore`]**: report and persist what each assertion removes or
//!   repairs while resolving cumulatively.
//! - **[`apply`]**: resolve cumulatively and persist the cleaned table.
//! - **[`validate`]**: read-only check that a table already satisfies the
//!   chain, failing on the first violated assertion.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: pure logic (tables, assertions, the evaluation engine).
//! - **[`io`]**: storage sinks and CSV encoding.

pub mod apply;
pub mod artifacts;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod explore;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;

pub use crate::apply::{apply, resolve_chain};
pub use crate::core::assertion::{Assertion, Operation, Predicate, Resolver, each_row, rows};
pub use crate::core::engine::{Violations, compute_violations, resolve};
pub use crate::core::registry::AssertionChain;
pub use crate::core::report::FailureReport;
pub use crate::core::table::{Mask, Row, Table, Value, field};
pub use crate::error::ChainError;
pub use crate::explore::explore;
pub use crate::io::sink::{MemorySink, StorageSink};
pub use crate::validate::validate;
