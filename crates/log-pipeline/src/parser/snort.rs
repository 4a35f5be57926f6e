//! Snort fast-alert 파서
//!
//! Snort의 `alert_fast` 출력 한 줄을 파싱합니다.
//!
//! # 형식
//! ```text
//! 07/05/25-21:45:22.123456 [**] [1:1000001:1] Test Snort Alert [**] [Priority: 0] {TCP} 192.168.1.100 -> 10.0.0.50
//! <timestamp>              [**] [1:<sid>:<rev>] <signature> [**] ...           {<proto>} <src> -> <dst>
//! ```
//!
//! 패턴에 맞지 않는 라인은 경보가 아닌 것으로 보고 조용히 무시합니다.

use chrono::NaiveDateTime;
use regex::Regex;

use super::AlertParser;
use crate::alert::{AlertMessage, AlertSource, SnortAlertFields};
use crate::error::LogPipelineError;

/// fast-alert 라인 패턴 (라인 시작에 고정)
const FAST_ALERT_PATTERN: &str = r"^(\d{2}/\d{2}/\d{2}-\d{2}:\d{2}:\d{2}\.\d+).*?\[1:(\d+):(\d+)\]\s(.*?)\s\[\*\*\].*?\{(\w+)\}\s(\S+)\s->\s(\S+)";

/// Snort 타임스탬프 형식
const SNORT_TIME_FORMAT: &str = "%m/%d/%y-%H:%M:%S%.f";

/// 메시지에 표시할 시각 형식
const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Snort fast-alert 파서
pub struct SnortParser {
    pattern: Regex,
}

impl SnortParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            pattern: Regex::new(FAST_ALERT_PATTERN)?,
        })
    }

    /// 라인에서 경보 필드를 추출합니다.
    ///
    /// SID와 리비전은 숫자로 바꾸지 않고 캡처한 텍스트 그대로 보관합니다
    /// (앞자리 0 유지, 길이 제한 없음). 패턴에 맞지 않으면 `None`을 반환합니다.
    pub fn extract(&self, line: &str) -> Option<SnortAlertFields> {
        let caps = self.pattern.captures(line.trim())?;

        // 패턴의 모든 그룹은 필수이므로 매칭되면 항상 존재
        let group = |idx: usize| caps.get(idx).map_or("", |m| m.as_str()).to_owned();

        Some(SnortAlertFields {
            timestamp: group(1),
            signature_id: group(2),
            revision: group(3),
            signature: group(4),
            protocol: group(5),
            source_ip: group(6),
            dest_ip: group(7),
        })
    }

    /// 라인을 알림 메시지로 변환합니다. 경보 라인이 아니면 `None`.
    pub fn parse(&self, line: &str) -> Option<AlertMessage> {
        self.extract(line).map(|fields| {
            let time = format_timestamp(&fields.timestamp);
            AlertMessage::snort(&fields, &time)
        })
    }
}

impl AlertParser for SnortParser {
    fn source(&self) -> AlertSource {
        AlertSource::Snort
    }

    fn parse_line(&self, line: &str) -> Result<Option<AlertMessage>, LogPipelineError> {
        Ok(self.parse(line))
    }
}

/// Snort 타임스탬프를 `YYYY-MM-DD HH:MM:SS`로 바꿉니다.
///
/// 변환할 수 없으면 원본 문자열을 그대로 돌려줍니다.
pub fn format_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, SNORT_TIME_FORMAT)
        .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_owned())
}
