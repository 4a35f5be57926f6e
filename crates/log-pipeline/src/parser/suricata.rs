//! Suricata eve.json 파서
//!
//! eve 로그는 한 줄에 JSON 객체 하나인 JSON Lines 형식입니다.
//! `alert` 키를 가진 레코드만 경보로 취급하고, 나머지 이벤트(flow, dns, http 등)는 무시합니다.
//!
//! # 필드
//! - 필수: `alert.signature`, `src_ip`, `dest_ip`
//! - 선택 (없으면 `"N/A"`): `timestamp`, `proto`, `alert.category`

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::warn;

use super::AlertParser;
use crate::alert::{AlertMessage, AlertSource, SuricataAlertFields};
use crate::error::LogPipelineError;

/// 선택 필드 기본값
const NOT_AVAILABLE: &str = "N/A";

/// eve 타임스탬프 형식 (예: `2025-07-05T21:45:22.123456+0700`)
const EVE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Suricata eve 경보 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct SuricataParser;

impl SuricataParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// JSON 한 줄을 디코딩합니다.
    ///
    /// - 디코딩 실패: `Err(Parse)`
    /// - `alert` 키가 없는 레코드: `Ok(None)`
    pub fn decode_line(line: &str) -> Result<Option<Value>, LogPipelineError> {
        let value: Value =
            serde_json::from_str(line.trim()).map_err(|e| LogPipelineError::Parse {
                format: "suricata".to_owned(),
                reason: format!("invalid JSON: {e}"),
            })?;

        let is_alert = value.as_object().is_some_and(|obj| obj.contains_key("alert"));
        Ok(is_alert.then_some(value))
    }

    /// 경보 레코드에서 필드를 추출합니다.
    pub fn extract(&self, record: &Value) -> Result<SuricataAlertFields, LogPipelineError> {
        let alert = record.get("alert");

        let signature = required(alert.and_then(|a| a.get("signature")), "alert.signature")?;
        let source_ip = required(record.get("src_ip"), "src_ip")?;
        let dest_ip = required(record.get("dest_ip"), "dest_ip")?;

        Ok(SuricataAlertFields {
            timestamp: optional(record.get("timestamp")),
            signature,
            source_ip,
            dest_ip,
            protocol: optional(record.get("proto")),
            category: optional(alert.and_then(|a| a.get("category"))),
        })
    }

    /// 경보 레코드를 알림 메시지로 변환합니다.
    ///
    /// 필수 필드가 없으면 어떤 필드가 빠졌는지 로그로 남기고 `None`을 반환합니다.
    pub fn parse(&self, record: &Value) -> Option<AlertMessage> {
        match self.extract(record) {
            Ok(fields) => Some(Self::format(&fields, record.get("timestamp"))),
            Err(e) => {
                warn!(error = %e, "failed to format suricata alert, discarding record");
                None
            }
        }
    }

    fn format(fields: &SuricataAlertFields, raw_timestamp: Option<&Value>) -> AlertMessage {
        let time = raw_timestamp
            .and_then(Value::as_str)
            .and_then(format_timestamp)
            .unwrap_or_else(|| fields.timestamp.clone());
        AlertMessage::suricata(fields, &time)
    }
}

impl AlertParser for SuricataParser {
    fn source(&self) -> AlertSource {
        AlertSource::Suricata
    }

    fn parse_line(&self, line: &str) -> Result<Option<AlertMessage>, LogPipelineError> {
        let Some(record) = Self::decode_line(line)? else {
            return Ok(None);
        };
        let fields = self.extract(&record)?;
        Ok(Some(Self::format(&fields, record.get("timestamp"))))
    }
}

/// eve 타임스탬프를 `YYYY-MM-DD HH:MM:SS <zone>`으로 바꿉니다.
///
/// `<zone>`은 오프셋이 0이면 `UTC`, 아니면 `UTC+07:00` 형태입니다.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let parsed: DateTime<FixedOffset> = DateTime::parse_from_str(raw, EVE_TIME_FORMAT).ok()?;
    Some(format!(
        "{} {}",
        parsed.format("%Y-%m-%d %H:%M:%S"),
        zone_label(parsed.offset())
    ))
}

fn zone_label(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "UTC".to_owned();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.unsigned_abs();
    format!("UTC{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

fn required(value: Option<&Value>, field: &str) -> Result<String, LogPipelineError> {
    value.map(render).ok_or_else(|| LogPipelineError::MissingField {
        format: "suricata".to_owned(),
        field: field.to_owned(),
    })
}

fn optional(value: Option<&Value>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), render)
}

// 문자열은 따옴표 없이, 그 외 스칼라는 JSON 표기 그대로
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
