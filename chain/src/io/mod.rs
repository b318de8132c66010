//! Side-effecting helpers: storage sinks and CSV encoding.

pub mod csv;
pub mod dir_sink;
pub mod sink;
