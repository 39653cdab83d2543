//! Tracing subscriber setup.
//!
//! Events go to stderr so command output on stdout stays scriptable.

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::ENV_LOG;

const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: `EPHEMERA_LOG`, then the config level, then `warn`.
fn filter_directive(env_value: Option<String>, config_level: Option<&str>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| config_level.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber.
pub fn init(config_level: Option<&str>) -> anyhow::Result<()> {
    let directive = filter_directive(std::env::var(ENV_LOG).ok(), config_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter: {}", directive))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}
