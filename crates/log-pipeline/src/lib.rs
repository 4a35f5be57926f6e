//! # idsgram-log-pipeline
//!
//! Snort/Suricata 경보 로그를 실시간으로 따라가며 텔레그램으로 알림을 보냅니다.
//!
//! # 모듈 구성
//!
//! - [`collector`]: 로그 파일 끝 따라가기 (`tail -f` 방식)
//! - [`parser`]: Snort fast-alert, Suricata eve JSON 파서
//! - [`alert`]: 경보 필드와 알림 메시지
//! - [`notifier`]: 텔레그램 전송 ([`Notifier`] trait)
//! - [`monitor`]: 폴링 루프 오케스트레이션
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileTail(snort)    -> SnortParser    -+
//!                                       +-> Notifier -> Telegram
//! FileTail(suricata) -> SuricataParser -+
//! ```
//!
//! # 사용 예시
//!
//! ```no_run
//! # async fn example() -> Result<(), idsgram_log_pipeline::LogPipelineError> {
//! use idsgram_core::IdsgramConfig;
//! use idsgram_log_pipeline::{LogMonitor, TelegramNotifier};
//!
//! let config = IdsgramConfig::default();
//! let notifier = TelegramNotifier::from_config(&config.telegram)?;
//! let mut monitor = LogMonitor::new(&config.monitor, notifier)?;
//! monitor.run().await;
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod collector;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod parser;

// --- 주요 타입 re-export ---

// 모니터
pub use monitor::{LogMonitor, PollReport};

// 알림
pub use alert::{AlertMessage, AlertSource, SnortAlertFields, SuricataAlertFields};
pub use notifier::{DeliveryResult, Notifier, TelegramNotifier};

// 파서
pub use parser::{AlertParser, SnortParser, SuricataParser};

// 수집기
pub use collector::{FileTail, TailState};

// 에러
pub use error::LogPipelineError;
