use anyhow::Result;
use clap::Parser;

use idsgram_daemon::cli::DaemonCli;
use idsgram_daemon::logging::{init_tracing, report_ignored_env_overrides};
use idsgram_daemon::metrics_server::install_metrics_recorder;
use idsgram_daemon::startup::resolve_config;
use idsgram_log_pipeline::{LogMonitor, TelegramNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();
    let resolved = resolve_config(&cli).await?;
    let config = resolved.config;

    if cli.validate {
        for warning in &resolved.env_warnings {
            eprintln!("warning: {warning}");
        }
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    init_tracing(&config.general)?;
    report_ignored_env_overrides(&resolved.env_warnings);

    if !resolved.file_found {
        tracing::warn!(
            path = %cli.config.display(),
            "config file not found, using defaults and environment variables"
        );
    }
    tracing::info!(config = ?config, "idsgram-daemon starting");

    if config.metrics.enabled {
        install_metrics_recorder(&config.metrics)?;
    }

    let notifier = TelegramNotifier::from_config(&config.telegram)
        .map_err(|e| anyhow::anyhow!("failed to build telegram notifier: {}", e))?;
    tracing::info!(endpoint = notifier.redacted_endpoint(), "telegram notifier ready");

    let mut monitor = LogMonitor::new(&config.monitor, notifier)
        .map_err(|e| anyhow::anyhow!("failed to build log monitor: {}", e))?;

    tokio::select! {
        () = monitor.run() => {}
        signal = wait_for_shutdown_signal() => {
            let signal = signal?;
            tracing::info!(signal, "shutdown signal received");
        }
    }

    tracing::info!("idsgram-daemon stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
