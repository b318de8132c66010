//! Deterministic, pure logic of the assertion chain.
//!
//! Core modules are free of I/O. They operate on in-memory tables and return
//! new values, which keeps every step testable in isolation.

pub mod assertion;
pub mod engine;
pub mod registry;
pub mod report;
pub mod table;
