//! 알림 메시지 -- 파싱된 경보 필드를 텔레그램 메시지로 변환합니다.
//!
//! 모든 [`AlertMessage`]는 정확히 하나의 로그 라인에서 만들어지며,
//! 생성 후에는 변경되지 않고 알림기에 한 번만 전달됩니다.

use std::fmt;

/// 경보를 만든 IDS 엔진
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSource {
    /// Snort fast-alert 텍스트 로그
    Snort,
    /// Suricata eve.json 로그
    Suricata,
}

impl AlertSource {
    /// 메트릭 레이블 및 로그 필드에 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snort => "snort",
            Self::Suricata => "suricata",
        }
    }
}

impl fmt::Display for AlertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snort fast-alert 한 줄에서 추출한 필드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnortAlertFields {
    /// 원본 타임스탬프 (`MM/DD/YY-HH:MM:SS.ffffff`)
    pub timestamp: String,
    /// 시그니처 ID (라인에 적힌 숫자 텍스트 그대로)
    pub signature_id: String,
    /// 시그니처 리비전 (라인에 적힌 숫자 텍스트 그대로)
    pub revision: String,
    /// 시그니처 설명
    pub signature: String,
    /// 프로토콜 (TCP, UDP, ICMP, IP ...)
    pub protocol: String,
    /// 출발지 주소 (포트가 붙어 있을 수 있음)
    pub source_ip: String,
    /// 목적지 주소 (포트가 붙어 있을 수 있음)
    pub dest_ip: String,
}

/// Suricata eve 경보 레코드에서 추출한 필드
///
/// 선택 필드가 없으면 `"N/A"`가 들어갑니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuricataAlertFields {
    /// 타임스탬프 (원본 그대로)
    pub timestamp: String,
    /// `alert.signature`
    pub signature: String,
    /// `src_ip`
    pub source_ip: String,
    /// `dest_ip`
    pub dest_ip: String,
    /// `proto`
    pub protocol: String,
    /// `alert.category`
    pub category: String,
}

/// 전송 준비가 끝난 알림 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    source: AlertSource,
    text: String,
}

impl AlertMessage {
    /// Snort 경보 메시지를 만듭니다.
    ///
    /// `time`은 이미 보기 좋게 변환된 시각이거나, 변환에 실패한 경우 원본 타임스탬프입니다.
    pub fn snort(fields: &SnortAlertFields, time: &str) -> Self {
        let text = format!(
            "🚨 *Snort Alert*\n\
             🕒 *Time*: {time}\n\
             📜 *Signature*: {signature}\n\
             🔢 *SID:Rev*: {sid}:{rev}\n\
             🌐 *Source IP*: {src}\n\
             🏁 *Destination IP*: {dst}\n\
             🔌 *Protocol*: {proto}",
            signature = fields.signature,
            sid = fields.signature_id,
            rev = fields.revision,
            src = fields.source_ip,
            dst = fields.dest_ip,
            proto = fields.protocol,
        );
        Self {
            source: AlertSource::Snort,
            text,
        }
    }

    /// Suricata 경보 메시지를 만듭니다.
    pub fn suricata(fields: &SuricataAlertFields, time: &str) -> Self {
        let text = format!(
            "🚨 *Suricata Alert*\n\
             🕒 *Time*: {time}\n\
             📜 *Signature*: {signature}\n\
             🌐 *Source IP*: {src}\n\
             🏁 *Destination IP*: {dst}\n\
             🔌 *Protocol*: {proto}\n\
             📋 *Category*: {category}",
            signature = fields.signature,
            src = fields.source_ip,
            dst = fields.dest_ip,
            proto = fields.protocol,
            category = fields.category,
        );
        Self {
            source: AlertSource::Suricata,
            text,
        }
    }

    /// 메시지를 만든 엔진
    pub fn source(&self) -> AlertSource {
        self.source
    }

    /// 메시지 본문
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
