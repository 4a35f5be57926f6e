//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 감시, 파싱, 알림 전송 중 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for IdsgramError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 모니터 루프 안에서는 어떤 에러도 프로세스를 종료시키지 않습니다.
//! 각 단계가 에러를 로그로 남기고 해당 라인이나 메시지만 버립니다.

use idsgram_core::error::{IdsgramError, PipelineError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 로그 라인 파싱 실패 (JSON 디코딩 실패, 숫자 범위 초과 등)
    #[error("parse error: {format}: {reason}")]
    Parse {
        /// 파서 형식 (snort, suricata)
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 필수 필드 누락
    #[error("missing required field '{field}' in {format} record")]
    MissingField {
        /// 파서 형식
        format: String,
        /// 누락된 필드 경로 (예: "alert.signature")
        field: String,
    },

    /// 로그 파일을 열 수 없음
    #[error("log source unavailable: {path}: {reason}")]
    SourceUnavailable {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 최대 길이를 초과한 라인
    #[error("line too long: {length} bytes (max: {max})")]
    LineTooLong {
        /// 라인 길이 (바이트)
        length: usize,
        /// 허용 최대 길이
        max: usize,
    },

    /// 알림 클라이언트 구성 실패
    #[error("notifier error: {0}")]
    Notifier(String),

    /// 텔레그램이 성공이 아닌 상태 코드로 응답
    #[error("telegram responded with {status}: {body}")]
    HttpStatus {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },

    /// HTTP 전송 에러 (연결 실패, 타임아웃 등)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for IdsgramError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Notifier(reason) => {
                IdsgramError::Pipeline(PipelineError::Notifier(reason))
            }
            other => IdsgramError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
