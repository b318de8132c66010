//! Development-time tracing.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics on stderr. Not persisted.
//!
//! - **Artifacts (`io/sink`)**: failed rows, manifests and cleaned tables.
//!   Always written, unaffected by the log filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor a verbosity flag asks for more.
pub const DEFAULT_FILTER: &str = "warn";

/// Directive for a `-v` count: 0 warns only, 1 adds per-pass `info` from the
/// chain crates, 2 or more adds per-assertion `debug`.
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_FILTER,
        1 => "warn,chain=info,inspections=info",
        _ => "warn,chain=debug,inspections=debug",
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the filter follows `verbosity`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=chain=debug inspections apply
/// inspections -vv explore
/// ```
pub fn init(verbosity: u8) {
    tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)))
}
