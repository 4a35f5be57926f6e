//! 설정 관리 -- idsgram.toml 파싱 및 런타임 설정
//!
//! [`IdsgramConfig`]는 데몬 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IDSGRAM_TELEGRAM_BOT_TOKEN=...` 형식)
//! 3. 설정 파일 (`idsgram.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), idsgram_core::error::IdsgramError> {
//! use idsgram_core::config::IdsgramConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IdsgramConfig::load("idsgram.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IdsgramConfig::parse("[telegram]\nbot_token = \"123:abc\"")?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, IdsgramError};

/// 허용되는 로그 레벨
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 허용되는 로그 형식
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// idsgram 통합 설정
///
/// `idsgram.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdsgramConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 텔레그램 알림 설정
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// 로그 감시 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 메트릭 노출 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl IdsgramConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IdsgramError> {
        let mut config = Self::from_file(path).await?;
        for warning in config.apply_env_overrides() {
            warning.emit();
        }
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용한 설정을 만듭니다.
    ///
    /// 설정 파일 없이 환경변수만으로 실행할 때 사용합니다.
    pub fn from_env() -> Result<Self, IdsgramError> {
        let mut config = Self::default();
        for warning in config.apply_env_overrides() {
            warning.emit();
        }
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 및 검증 없음).
    ///
    /// 토큰처럼 환경변수로만 주입되는 값이 있으므로 검증은 [`load`](Self::load)에서 합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IdsgramError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IdsgramError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IdsgramError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IdsgramError> {
        toml::from_str(toml_str).map_err(|e| {
            IdsgramError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IDSGRAM_{SECTION}_{FIELD}`
    /// 예: `IDSGRAM_MONITOR_SNORT_LOG_PATH=/var/log/snort/alert`
    ///
    /// 타입에 맞지 않는 값은 무시하고 기존 값을 유지합니다. 무시한 항목은 로그로 남기지 않고
    /// 반환하므로, 호출자가 tracing 구독자를 설치한 뒤 [`EnvOverrideWarning::emit`]으로 기록합니다.
    pub fn apply_env_overrides(&mut self) -> Vec<EnvOverrideWarning> {
        let mut warnings = Vec::new();
        let w = &mut warnings;

        // General
        override_string(&mut self.general.log_level, "IDSGRAM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IDSGRAM_GENERAL_LOG_FORMAT");

        // Telegram
        override_string(&mut self.telegram.bot_token, "IDSGRAM_TELEGRAM_BOT_TOKEN");
        override_string(&mut self.telegram.chat_id, "IDSGRAM_TELEGRAM_CHAT_ID");
        override_string(
            &mut self.telegram.api_base_url,
            "IDSGRAM_TELEGRAM_API_BASE_URL",
        );
        override_string(&mut self.telegram.parse_mode, "IDSGRAM_TELEGRAM_PARSE_MODE");
        override_parsed(
            &mut self.telegram.timeout_secs,
            "IDSGRAM_TELEGRAM_TIMEOUT_SECS",
            "u64",
            w,
        );
        override_parsed(
            &mut self.telegram.insecure_skip_tls_verify,
            "IDSGRAM_TELEGRAM_INSECURE_SKIP_TLS_VERIFY",
            "bool",
            w,
        );

        // Monitor
        override_string(
            &mut self.monitor.snort_log_path,
            "IDSGRAM_MONITOR_SNORT_LOG_PATH",
        );
        override_string(
            &mut self.monitor.suricata_log_path,
            "IDSGRAM_MONITOR_SURICATA_LOG_PATH",
        );
        override_parsed(
            &mut self.monitor.idle_pause_ms,
            "IDSGRAM_MONITOR_IDLE_PAUSE_MS",
            "u64",
            w,
        );
        override_parsed(
            &mut self.monitor.max_line_length,
            "IDSGRAM_MONITOR_MAX_LINE_LENGTH",
            "usize",
            w,
        );

        // Metrics
        override_parsed(&mut self.metrics.enabled, "IDSGRAM_METRICS_ENABLED", "bool", w);
        override_string(&mut self.metrics.listen_addr, "IDSGRAM_METRICS_LISTEN_ADDR");
        override_parsed(&mut self.metrics.port, "IDSGRAM_METRICS_PORT", "u16", w);

        warnings
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IdsgramError> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", VALID_LOG_FORMATS.join(", ")),
            ));
        }

        if self.telegram.bot_token.trim().is_empty() {
            return Err(invalid(
                "telegram.bot_token",
                "must not be empty (set it in the config file or IDSGRAM_TELEGRAM_BOT_TOKEN)",
            ));
        }

        if self.telegram.chat_id.trim().is_empty() {
            return Err(invalid(
                "telegram.chat_id",
                "must not be empty (set it in the config file or IDSGRAM_TELEGRAM_CHAT_ID)",
            ));
        }

        let base = self.telegram.api_base_url.as_str();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(invalid(
                "telegram.api_base_url",
                "must start with http:// or https://",
            ));
        }

        if self.telegram.timeout_secs == 0 {
            return Err(invalid("telegram.timeout_secs", "must be greater than 0"));
        }

        if self.monitor.idle_pause_ms == 0 {
            return Err(invalid("monitor.idle_pause_ms", "must be greater than 0"));
        }

        if self.monitor.max_line_length == 0 {
            return Err(invalid("monitor.max_line_length", "must be greater than 0"));
        }

        if self.monitor.snort_log_path.is_empty() && self.monitor.suricata_log_path.is_empty() {
            return Err(invalid(
                "monitor",
                "at least one of snort_log_path or suricata_log_path must be set",
            ));
        }

        if self.metrics.enabled {
            self.metrics.socket_addr()?;
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 텔레그램 Bot API 설정
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// 봇 토큰
    pub bot_token: String,
    /// 알림을 받을 채팅 ID
    pub chat_id: String,
    /// Bot API 베이스 URL
    pub api_base_url: String,
    /// 메시지 포맷 모드 (`Markdown`, `MarkdownV2`, `HTML`)
    pub parse_mode: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// TLS 인증서 검증 생략 여부
    ///
    /// 자체 서명 인증서를 쓰는 프록시 뒤에서만 켜야 합니다.
    /// 켜면 중간자 공격에 노출됩니다.
    pub insecure_skip_tls_verify: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base_url: "https://api.telegram.org".to_owned(),
            parse_mode: "Markdown".to_owned(),
            timeout_secs: 5,
            insecure_skip_tls_verify: false,
        }
    }
}

// 봇 토큰이 로그에 찍히지 않도록 Debug를 직접 구현
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("parse_mode", &self.parse_mode)
            .field("timeout_secs", &self.timeout_secs)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .finish()
    }
}

/// 로그 감시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Snort fast-alert 로그 경로 (빈 문자열이면 비활성화)
    pub snort_log_path: String,
    /// Suricata eve.json 로그 경로 (빈 문자열이면 비활성화)
    pub suricata_log_path: String,
    /// 새 라인이 없을 때 소스별 대기 시간 (밀리초)
    pub idle_pause_ms: u64,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            snort_log_path: "/var/log/snort/snort.alert.fast".to_owned(),
            suricata_log_path: "/var/log/suricata/eve.json".to_owned(),
            idle_pause_ms: 100,
            max_line_length: 64 * 1024, // 64KB
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
}

impl MetricsConfig {
    /// `listen_addr:port`를 소켓 주소로 변환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, IdsgramError> {
        format!("{}:{}", self.listen_addr, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("metrics.listen_addr", e.to_string()))
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9187,
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> IdsgramError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 파싱에 실패해 무시한 환경변수 오버라이드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverrideWarning {
    /// 환경변수 이름
    pub env_key: String,
    /// 설정되어 있던 값
    pub value: String,
    /// 기대한 타입 이름
    pub expected: &'static str,
}

impl EnvOverrideWarning {
    /// 현재 tracing 구독자에 경고로 기록합니다.
    pub fn emit(&self) {
        warn!(
            env_key = self.env_key.as_str(),
            value = self.value.as_str(),
            expected = self.expected,
            "failed to parse env var, ignoring"
        );
    }
}

impl std::fmt::Display for EnvOverrideWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to parse env var {}='{}' as {}, ignoring",
            self.env_key, self.value, self.expected
        )
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: std::str::FromStr>(
    target: &mut T,
    env_key: &str,
    expected: &'static str,
    warnings: &mut Vec<EnvOverrideWarning>,
) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warnings.push(EnvOverrideWarning {
                env_key: env_key.to_owned(),
                value: val,
                expected,
            }),
        }
    }
}
