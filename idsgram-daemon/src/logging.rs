//! Tracing setup for idsgram-daemon.
//!
//! The subscriber is built from two layers: an output layer chosen by
//! `general.log_format` and a level filter from `general.log_level`
//! (or `RUST_LOG`). It is installed only after the configuration has been
//! resolved, so problems found during resolution are replayed afterwards
//! with [`report_ignored_env_overrides`].

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use idsgram_core::config::{EnvOverrideWarning, GeneralConfig};

/// Formatting layer stacked directly on the registry.
pub type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Call once, after configuration is resolved. Fails if a global subscriber
/// is already set or the log format is unknown.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(output_layer(&config.log_format)?)
        .with(level_filter(&config.log_level))
        .try_init()
        .map_err(|e| {
            anyhow::anyhow!(
                "failed to initialize {} tracing subscriber: {}",
                config.log_format,
                e
            )
        })
}

/// Level filter. `RUST_LOG` wins over the configured level.
pub fn level_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Output layer for a `general.log_format` value.
///
/// `json` emits one object per line with event fields flattened to the top
/// level, so `source`, `error` and `env_key` can be queried directly.
/// `pretty` is the multi-line human format.
pub fn output_layer(format: &str) -> Result<OutputLayer> {
    match format {
        "json" => Ok(fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed()),
        "pretty" => Ok(fmt::layer().pretty().boxed()),
        other => Err(anyhow::anyhow!(
            "unknown log format '{}', expected 'json' or 'pretty'",
            other
        )),
    }
}

/// Log every env override that was ignored while resolving the config.
pub fn report_ignored_env_overrides(warnings: &[EnvOverrideWarning]) {
    for warning in warnings {
        warning.emit();
    }
}
