//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `idsgram_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(idsgram_core::metrics::LINES_READ_TOTAL, "source" => "snort").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 소스 레이블 키 (snort, suricata)
pub const LABEL_SOURCE: &str = "source";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 메트릭 이름 ───────────────────────────────────────────────────

/// 로그 파일에서 읽은 라인 수 (counter, label: source)
pub const LINES_READ_TOTAL: &str = "idsgram_lines_read_total";

/// 알림 메시지로 변환된 라인 수 (counter, label: source)
pub const ALERTS_PARSED_TOTAL: &str = "idsgram_alerts_parsed_total";

/// 파싱에 실패해 버려진 라인 수 (counter, label: source)
pub const PARSE_ERRORS_TOTAL: &str = "idsgram_parse_errors_total";

/// 알림 전송 시도 수 (counter, label: result)
pub const NOTIFICATIONS_TOTAL: &str = "idsgram_notifications_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 전역 recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        LINES_READ_TOTAL,
        "Total number of complete lines read from tailed IDS log files"
    );
    describe_counter!(
        ALERTS_PARSED_TOTAL,
        "Total number of lines turned into an alert message"
    );
    describe_counter!(
        PARSE_ERRORS_TOTAL,
        "Total number of lines discarded because they could not be decoded or were missing fields"
    );
    describe_counter!(
        NOTIFICATIONS_TOTAL,
        "Total number of Telegram delivery attempts by result"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            LINES_READ_TOTAL,
            ALERTS_PARSED_TOTAL,
            PARSE_ERRORS_TOTAL,
            NOTIFICATIONS_TOTAL,
        ] {
            assert!(name.starts_with("idsgram_"), "{name}");
            assert!(name.ends_with("_total"), "{name}");
        }
    }

    #[test]
    fn describe_without_recorder_is_noop() {
        describe_all();
    }
}
