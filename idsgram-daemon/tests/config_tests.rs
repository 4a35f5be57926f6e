//! Configuration resolution tests.
//!
//! Tests file loading, the missing-file fallback, and CLI > env > file precedence.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use idsgram_daemon::cli::DaemonCli;
use idsgram_daemon::logging::report_ignored_env_overrides;
use idsgram_daemon::startup::resolve_config;
use serial_test::serial;

const VALID_TOML: &str = r#"
[general]
log_level = "warn"
log_format = "pretty"

[telegram]
bot_token = "123456:FILE-TOKEN"
chat_id = "-1001234567890"

[monitor]
snort_log_path = "/var/log/snort/snort.alert.fast"
suricata_log_path = "/var/log/suricata/eve.json"
"#;

const ENV_KEYS: [&str; 6] = [
    "IDSGRAM_TELEGRAM_BOT_TOKEN",
    "IDSGRAM_TELEGRAM_TIMEOUT_SECS",
    "IDSGRAM_TELEGRAM_CHAT_ID",
    "IDSGRAM_GENERAL_LOG_LEVEL",
    "IDSGRAM_MONITOR_SNORT_LOG_PATH",
    "IDSGRAM_MONITOR_SURICATA_LOG_PATH",
];

/// Sets the given `IDSGRAM_*` variables, clears the other known keys,
/// and restores everything on drop.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(vars: &[(&str, &str)]) -> Self {
        let saved = ENV_KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        // SAFETY: every test touching the environment is #[serial].
        unsafe {
            for key in ENV_KEYS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }

        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: test cleanup
        unsafe {
            for (key, value) in &self.saved {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

fn cli(config: &Path, extra: &[&str]) -> DaemonCli {
    let mut args = vec!["idsgram-daemon", "-c", config.to_str().expect("utf-8 path")];
    args.extend_from_slice(extra);
    DaemonCli::try_parse_from(args).expect("cli should parse")
}

#[tokio::test]
#[serial]
async fn test_load_from_file() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[]);

    // Given: a complete config file and no environment overrides
    let cli = cli(file.path(), &[]);

    // When: resolving
    let resolved = resolve_config(&cli).await.expect("config should resolve");

    // Then: file values are used
    assert!(resolved.file_found);
    assert_eq!(resolved.config.general.log_level, "warn");
    assert_eq!(resolved.config.telegram.bot_token, "123456:FILE-TOKEN");
    assert_eq!(resolved.config.telegram.timeout_secs, 5);
}

#[tokio::test]
#[serial]
async fn test_missing_file_falls_back_to_env() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("idsgram.toml");

    let _env = EnvGuard::set(&[
        ("IDSGRAM_TELEGRAM_BOT_TOKEN", "123456:ENV-TOKEN"),
        ("IDSGRAM_TELEGRAM_CHAT_ID", "42"),
    ]);

    let resolved = resolve_config(&cli(&missing, &[]))
        .await
        .expect("env-only config should resolve");

    assert!(!resolved.file_found);
    assert_eq!(resolved.config.telegram.bot_token, "123456:ENV-TOKEN");
    assert_eq!(resolved.config.telegram.chat_id, "42");
    assert_eq!(
        resolved.config.monitor.suricata_log_path,
        "/var/log/suricata/eve.json"
    );
}

#[tokio::test]
#[serial]
async fn test_missing_file_without_token_fails_validation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("idsgram.toml");

    let _env = EnvGuard::set(&[]);

    let err = resolve_config(&cli(&missing, &[]))
        .await
        .expect_err("empty token must be rejected");
    assert!(err.to_string().contains("bot_token"), "{err}");
}

#[tokio::test]
#[serial]
async fn test_cli_beats_env_beats_file() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[
        ("IDSGRAM_GENERAL_LOG_LEVEL", "debug"),
        ("IDSGRAM_TELEGRAM_BOT_TOKEN", "123456:ENV-TOKEN"),
        ("IDSGRAM_MONITOR_SNORT_LOG_PATH", "/env/snort.alert.fast"),
    ]);

    let cli = cli(
        file.path(),
        &["--log-level", "trace", "--snort-log", "/cli/snort.alert.fast"],
    );
    let config = resolve_config(&cli).await.expect("should resolve").config;

    assert_eq!(config.general.log_level, "trace");
    assert_eq!(config.monitor.snort_log_path, "/cli/snort.alert.fast");
    assert_eq!(config.telegram.bot_token, "123456:ENV-TOKEN");
    assert_eq!(config.general.log_format, "pretty");
}

#[tokio::test]
#[serial]
async fn test_disabling_both_sources_fails_validation() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[]);

    let cli = cli(file.path(), &["--snort-log", "", "--suricata-log", ""]);
    let err = resolve_config(&cli)
        .await
        .expect_err("no sources must be rejected");
    assert!(err.to_string().contains("snort_log_path"), "{err}");
}

#[tokio::test]
#[serial]
async fn test_malformed_file_is_an_error() {
    let file = write_config("[telegram\nbot_token = 1");

    let _env = EnvGuard::set(&[]);

    let err = resolve_config(&cli(file.path(), &[]))
        .await
        .expect_err("malformed TOML must fail");
    assert!(err.to_string().contains("failed to load config"), "{err}");
}

#[tokio::test]
#[serial]
async fn test_invalid_cli_log_format_fails_validation() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[]);

    let cli = cli(file.path(), &["--log-format", "xml"]);
    assert!(resolve_config(&cli).await.is_err());
}

/// In-memory log sink for a scoped `fmt` subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
#[serial]
async fn test_unparseable_env_value_is_kept_for_logging() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[("IDSGRAM_TELEGRAM_TIMEOUT_SECS", "abc")]);

    // Given: no subscriber is installed while resolving
    let resolved = resolve_config(&cli(file.path(), &[]))
        .await
        .expect("bad override must not fail resolution");

    // Then: the default survives and the ignored value is handed back
    assert_eq!(resolved.config.telegram.timeout_secs, 5);
    assert_eq!(resolved.env_warnings.len(), 1);
    assert_eq!(
        resolved.env_warnings[0].env_key,
        "IDSGRAM_TELEGRAM_TIMEOUT_SECS"
    );
    assert_eq!(resolved.env_warnings[0].value, "abc");

    // When: logging comes up afterwards
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        report_ignored_env_overrides(&resolved.env_warnings);
    });

    // Then: the warning reaches the log output
    let text = logs.text();
    assert!(text.contains("WARN"), "{text}");
    assert!(text.contains("failed to parse env var"), "{text}");
    assert!(text.contains("IDSGRAM_TELEGRAM_TIMEOUT_SECS"), "{text}");
}

#[tokio::test]
#[serial]
async fn test_valid_env_values_produce_no_warnings() {
    let file = write_config(VALID_TOML);

    let _env = EnvGuard::set(&[("IDSGRAM_TELEGRAM_TIMEOUT_SECS", "12")]);

    let resolved = resolve_config(&cli(file.path(), &[]))
        .await
        .expect("should resolve");
    assert_eq!(resolved.config.telegram.timeout_secs, 12);
    assert!(resolved.env_warnings.is_empty());
}
