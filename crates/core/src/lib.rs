//! idsgram 공통 크레이트
//!
//! 설정 로딩([`config`]), 최상위 에러 타입([`error`]), 메트릭 이름([`metrics`])을
//! 다른 크레이트와 데몬이 함께 사용할 수 있도록 제공합니다.

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, IdsgramError, PipelineError};

// 설정
pub use config::{
    GeneralConfig, IdsgramConfig, MetricsConfig, MonitorConfig, TelegramConfig,
};
