//! Tracing setup for lifecycle-runner.
//!
//! Every event is written to stderr. Stdout belongs to the command output:
//! the `cf` call listing of a dry run and the `validate` plan table, both
//! meant to be piped or diffed. Suite events carry the `run_id` of their
//! `suite` span and the worker index of their `worker` span.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lifecycle_core::config::GeneralConfig;

/// Install the global subscriber from the `[general]` section.
///
/// `RUST_LOG` overrides `log_level`. `log_format` is `json` for CI log
/// collection or `pretty` for a terminal. Fails if a subscriber is already
/// installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e))?,
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| {
                anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
            })?,
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            ));
        }
    }

    Ok(())
}
