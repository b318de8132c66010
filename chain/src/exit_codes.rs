//! Stable exit codes for chain-driven CLI commands.

/// Command succeeded; for `validate`, the table satisfies the chain.
pub const OK: i32 = 0;
/// Command failed due to invalid config, input, chain or storage.
pub const INVALID: i32 = 1;
/// `validate` found an assertion with violating rows.
pub const NOT_CLEAN: i32 = 2;
