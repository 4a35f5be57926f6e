//! Configuration resolution for idsgram-daemon.
//!
//! Precedence, highest first: CLI flags, `IDSGRAM_*` environment variables,
//! the config file, built-in defaults.

use std::path::Path;

use anyhow::Result;
use idsgram_core::config::{EnvOverrideWarning, IdsgramConfig};
use idsgram_core::error::{ConfigError, IdsgramError};

use crate::cli::DaemonCli;

/// Fully merged and validated configuration.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Effective configuration.
    pub config: IdsgramConfig,
    /// Whether the config file existed. When `false`, only defaults and
    /// environment variables were used.
    pub file_found: bool,
    /// Environment overrides that were ignored because their value did not
    /// parse. Resolution runs before the tracing subscriber exists, so these
    /// are logged by the caller once logging is up.
    pub env_warnings: Vec<EnvOverrideWarning>,
}

/// Load the config file, then apply environment and CLI overrides, then validate.
///
/// A missing config file is not an error; any other read or parse failure is.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the merged
/// configuration is invalid.
pub async fn resolve_config(cli: &DaemonCli) -> Result<ResolvedConfig> {
    let (mut config, file_found) = load_file_or_default(&cli.config).await?;

    let env_warnings = config.apply_env_overrides();
    apply_cli_overrides(&mut config, cli);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    Ok(ResolvedConfig {
        config,
        file_found,
        env_warnings,
    })
}

async fn load_file_or_default(path: &Path) -> Result<(IdsgramConfig, bool)> {
    match IdsgramConfig::from_file(path).await {
        Ok(config) => Ok((config, true)),
        Err(IdsgramError::Config(ConfigError::FileNotFound { .. })) => {
            Ok((IdsgramConfig::default(), false))
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to load config '{}': {}",
            path.display(),
            e
        )),
    }
}

/// Apply CLI flags on top of the file and environment values.
pub fn apply_cli_overrides(config: &mut IdsgramConfig, cli: &DaemonCli) {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    if let Some(path) = &cli.snort_log {
        config.monitor.snort_log_path = path.clone();
    }
    if let Some(path) = &cli.suricata_log {
        config.monitor.suricata_log_path = path.clone();
    }
}
