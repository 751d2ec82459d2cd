//! Diagnostic logging setup
//!
//! User-facing progress goes through `Context`; this subscriber only carries
//! `tracing` diagnostics to stderr.

use crate::runner::Verbosity;
use anyhow::Context as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v` enables debug output and
/// everything else shows warnings only.
pub fn init(verbosity: Verbosity) -> anyhow::Result<()> {
    let default_level = match verbosity {
        Verbosity::Verbose => LevelFilter::DEBUG,
        Verbosity::Silent => LevelFilter::ERROR,
        _ => LevelFilter::WARN,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env()
        .context("invalid RUST_LOG filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")?;

    tracing::debug!(?verbosity, "logging initialised");
    Ok(())
}
