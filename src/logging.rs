//! Structured logging setup on top of `tracing-subscriber`.
//!
//! Logs go to stderr so stdout stays clean for summaries and JSON reports.
//! `EDUSLIDE_LOG` takes an `EnvFilter` directive and overrides `-v`.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "EDUSLIDE_LOG";

/// Level for a count of `-v` flags.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbosity: u8) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => Ok(EnvFilter::try_new(directive)?),
        _ => Ok(EnvFilter::try_new(format!(
            "eduslide={level},warn",
            level = level_for_verbosity(verbosity)
        ))?),
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let filter = build_env_filter(verbosity)?;
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2);

    // A subscriber may already be set (tests, repeated init); keep it.
    let _ = Registry::default().with(filter).with(layer).try_init();
    Ok(())
}
