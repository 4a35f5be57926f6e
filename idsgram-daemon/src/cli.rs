//! CLI argument definitions for idsgram-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Forwards Snort and Suricata alerts to a Telegram chat.
///
/// Tails the Snort fast-alert log and the Suricata eve.json log, and sends
/// one Telegram message per alert line appended after startup.
#[derive(Parser, Debug)]
#[command(name = "idsgram-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to idsgram.toml configuration file.
    ///
    /// If the file does not exist, defaults plus `IDSGRAM_*` environment
    /// variables are used instead.
    #[arg(short, long, default_value = "/etc/idsgram/idsgram.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the Snort fast-alert log path ("" disables the source).
    #[arg(long)]
    pub snort_log: Option<String>,

    /// Override the Suricata eve.json log path ("" disables the source).
    #[arg(long)]
    pub suricata_log: Option<String>,

    /// Validate configuration and exit without starting the monitor.
    #[arg(long)]
    pub validate: bool,
}
