//! 텔레그램 알림 전송
//!
//! [`Notifier`] trait은 알림 전송을 추상화하여, 프로덕션에서는 [`TelegramNotifier`]를,
//! 테스트에서는 기록용 mock을 사용할 수 있게 합니다.
//!
//! ```text
//! ┌────────────┐
//! │ LogMonitor │
//! └─────┬──────┘
//!       ▼
//!  ┌──────────┐
//!  │ Notifier │ (trait)
//!  └──────────┘
//!     │     │
//!     ▼     ▼
//! ┌────────┐ ┌──────┐
//! │Telegram│ │ Mock │
//! └───┬────┘ └──────┘
//!     ▼
//!  Bot API sendMessage
//! ```
//!
//! 전송은 한 번만 시도합니다. 실패한 메시지는 재시도 없이 버려지고,
//! 실패 사유는 로그와 `idsgram_notifications_total{result="failure"}` 메트릭으로만 남습니다.

use std::future::Future;
use std::time::Duration;

use idsgram_core::config::TelegramConfig;
use idsgram_core::metrics as m;
use tracing::{debug, error, warn};

use crate::alert::AlertMessage;
use crate::error::LogPipelineError;

/// 전송 결과
///
/// 로그와 메트릭에만 쓰이고 보관되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// `200 OK` 응답
    Delivered,
    /// 200이 아닌 상태 코드로 응답 (다른 2xx 포함)
    Rejected {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },
    /// 연결 실패, 타임아웃 등 응답을 받지 못함
    Failed {
        /// 실패 사유
        reason: String,
    },
}

impl DeliveryResult {
    /// 전송 성공 여부
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// `result` 메트릭 레이블 값
    pub fn as_label(&self) -> &'static str {
        if self.is_delivered() {
            "success"
        } else {
            "failure"
        }
    }
}

/// 알림 전송 추상화
///
/// `send`는 에러를 반환하지 않습니다. 모든 전송 실패는 구현체가 로그로 남기고
/// [`DeliveryResult`]로 알려줍니다.
pub trait Notifier: Send + Sync {
    /// 메시지 하나를 전송합니다.
    fn send(&self, message: &AlertMessage) -> impl Future<Output = DeliveryResult> + Send;
}

/// Telegram Bot API `sendMessage` 알림기
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    /// 토큰을 가린 엔드포인트 (로그용)
    redacted_endpoint: String,
    chat_id: String,
    parse_mode: String,
}

impl TelegramNotifier {
    /// 설정에서 알림기를 생성합니다.
    ///
    /// `insecure_skip_tls_verify`가 켜져 있으면 경고 로그를 남깁니다.
    ///
    /// # Errors
    ///
    /// HTTP 클라이언트를 만들 수 없으면 `LogPipelineError::Notifier`를 반환합니다.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, LogPipelineError> {
        let base = config.api_base_url.trim_end_matches('/');

        if config.insecure_skip_tls_verify {
            warn!(
                api_base_url = %base,
                "TLS certificate verification is disabled for the Telegram endpoint"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .build()
            .map_err(|e| LogPipelineError::Notifier(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{base}/bot{}/sendMessage", config.bot_token),
            redacted_endpoint: format!("{base}/bot<redacted>/sendMessage"),
            chat_id: config.chat_id.clone(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    /// 토큰을 가린 엔드포인트
    pub fn redacted_endpoint(&self) -> &str {
        &self.redacted_endpoint
    }

    async fn try_send(&self, message: &AlertMessage) -> Result<(), LogPipelineError> {
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", message.as_str()),
            ("parse_mode", self.parse_mode.as_str()),
        ];

        // reqwest 에러 메시지에 URL(토큰 포함)이 들어가지 않도록 제거
        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| LogPipelineError::Http(e.without_url()))?;

        // Bot API는 성공 시 항상 200을 돌려주므로 다른 2xx도 실패로 봄
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(LogPipelineError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, message: &AlertMessage) -> DeliveryResult {
        let result = match self.try_send(message).await {
            Ok(()) => {
                debug!(source = %message.source(), "alert delivered");
                DeliveryResult::Delivered
            }
            Err(LogPipelineError::HttpStatus { status, body }) => {
                warn!(
                    source = %message.source(),
                    status,
                    body = %body,
                    endpoint = %self.redacted_endpoint,
                    "telegram rejected alert"
                );
                DeliveryResult::Rejected { status, body }
            }
            Err(e) => {
                error!(
                    source = %message.source(),
                    error = %e,
                    endpoint = %self.redacted_endpoint,
                    "failed to reach telegram"
                );
                DeliveryResult::Failed {
                    reason: e.to_string(),
                }
            }
        };

        metrics::counter!(m::NOTIFICATIONS_TOTAL, m::LABEL_RESULT => result.as_label()).increment(1);
        result
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("endpoint", &self.redacted_endpoint)
            .field("chat_id", &self.chat_id)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::SnortAlertFields;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const TOKEN: &str = "123456:SECRET-TOKEN";

    fn config(base: &str) -> TelegramConfig {
        TelegramConfig {
            bot_token: TOKEN.to_owned(),
            chat_id: "-1001234567890".to_owned(),
            api_base_url: base.to_owned(),
            timeout_secs: 2,
            ..TelegramConfig::default()
        }
    }

    fn message() -> AlertMessage {
        let fields = SnortAlertFields {
            timestamp: "07/05/25-21:45:22.123456".to_owned(),
            signature_id: "1000001".to_owned(),
            revision: "1".to_owned(),
            signature: "Test Snort Alert".to_owned(),
            protocol: "TCP".to_owned(),
            source_ip: "192.168.1.100".to_owned(),
            dest_ip: "10.0.0.50".to_owned(),
        };
        AlertMessage::snort(&fields, "2025-07-05 21:45:22")
    }

    /// 요청 하나를 받아 고정 응답을 돌려주는 가짜 Bot API 서버.
    /// 받은 요청 전체(헤더 + 본문)를 반환합니다.
    async fn fake_telegram(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    #[tokio::test]
    async fn success_response_is_delivered() {
        let (base, server) = fake_telegram("200 OK", r#"{"ok":true}"#).await;
        let notifier = TelegramNotifier::from_config(&config(&base)).unwrap();

        let result = notifier.send(&message()).await;
        assert_eq!(result, DeliveryResult::Delivered);

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!("POST /bot{TOKEN}/sendMessage HTTP/1.1")));
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.contains("chat_id=-1001234567890"));
        assert!(request.contains("parse_mode=Markdown"));
        assert!(request.contains("text="));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let body = r#"{"ok":false,"error_code":500,"description":"Internal Server Error"}"#;
        let (base, server) = fake_telegram("500 Internal Server Error", body).await;
        let notifier = TelegramNotifier::from_config(&config(&base)).unwrap();

        let result = notifier.send(&message()).await;
        assert_eq!(
            result,
            DeliveryResult::Rejected {
                status: 500,
                body: body.to_owned()
            }
        );
        assert_eq!(result.as_label(), "failure");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn other_2xx_status_is_not_delivered() {
        let (base, server) = fake_telegram("204 No Content", "").await;
        let notifier = TelegramNotifier::from_config(&config(&base)).unwrap();

        let result = notifier.send(&message()).await;
        assert_eq!(
            result,
            DeliveryResult::Rejected {
                status: 204,
                body: String::new()
            }
        );
        assert!(!result.is_delivered());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_failed_without_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = TelegramNotifier::from_config(&config(&format!("http://{addr}"))).unwrap();
        match notifier.send(&message()).await {
            DeliveryResult::Failed { reason } => assert!(!reason.contains("SECRET-TOKEN"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_is_built_from_base_url() {
        let notifier = TelegramNotifier::from_config(&config("https://api.telegram.org/")).unwrap();
        assert_eq!(
            notifier.endpoint,
            format!("https://api.telegram.org/bot{TOKEN}/sendMessage")
        );
        assert_eq!(
            notifier.redacted_endpoint(),
            "https://api.telegram.org/bot<redacted>/sendMessage"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let mut cfg = config("https://api.telegram.org");
        cfg.insecure_skip_tls_verify = true;
        let notifier = TelegramNotifier::from_config(&cfg).unwrap();
        let debug = format!("{notifier:?}");
        assert!(!debug.contains("SECRET-TOKEN"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn delivery_result_labels() {
        assert_eq!(DeliveryResult::Delivered.as_label(), "success");
        assert!(DeliveryResult::Delivered.is_delivered());
        let failed = DeliveryResult::Failed {
            reason: "timeout".to_owned(),
        };
        assert_eq!(failed.as_label(), "failure");
        assert!(!failed.is_delivered());
    }
}
