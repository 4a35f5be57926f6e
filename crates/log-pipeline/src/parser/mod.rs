//! 로그 파싱 모듈 -- Snort fast-alert, Suricata eve JSON 파서
//!
//! 각 파서는 [`AlertParser`] trait을 구현하며, 모니터는 소스별로 등록된 파서에
//! 새 라인을 그대로 넘깁니다.
//!
//! # 지원 형식
//! - Snort fast-alert 텍스트 ([`SnortParser`])
//! - Suricata eve.json, JSON Lines ([`SuricataParser`])
//!
//! # 사용 예시
//! ```ignore
//! use idsgram_log_pipeline::parser::{AlertParser, SnortParser};
//!
//! let parser = SnortParser::new()?;
//! let line = "07/05/25-21:45:22.123456 [**] [1:1000001:1] Test [**] [Priority: 0] {TCP} 10.0.0.1 -> 10.0.0.2";
//! let message = parser.parse_line(line)?;
//! ```

pub mod snort;
pub mod suricata;

pub use snort::SnortParser;
pub use suricata::SuricataParser;

use crate::alert::{AlertMessage, AlertSource};
use crate::error::LogPipelineError;

/// 경보 파서 trait
///
/// 새로운 IDS 로그 형식을 지원하려면 이 trait을 구현합니다.
pub trait AlertParser: Send + Sync {
    /// 이 파서가 처리하는 로그 소스
    fn source(&self) -> AlertSource;

    /// 로그 한 줄을 알림 메시지로 변환합니다.
    ///
    /// - `Ok(Some(_))`: 경보 라인
    /// - `Ok(None)`: 경보가 아닌 라인 (에러 아님)
    /// - `Err(_)`: 경보로 보이지만 처리할 수 없는 라인
    fn parse_line(&self, line: &str) -> Result<Option<AlertMessage>, LogPipelineError>;
}
