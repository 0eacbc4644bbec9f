//! Process-wide log output
//!
//! Every crate logs through `tracing` under a `vexdb::*` target. This module
//! installs the `fmt` subscriber that prints those events, filtered by the
//! `[log]` section of `vexdb.toml` or by `RUST_LOG` when it is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use vexdb_engine::LogConfig;

/// Build the filter for `config`
///
/// `RUST_LOG` wins over `config.level`. An unparsable level falls back to
/// `info`.
pub fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed, which is expected
/// when several tests in one binary call this.
pub fn init(config: &LogConfig) -> bool {
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(config.color);

    tracing_subscriber::registry()
        .with(filter(config))
        .with(layer)
        .try_init()
        .is_ok()
}
