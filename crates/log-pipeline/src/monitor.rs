//! 로그 모니터 -- 두 IDS 로그를 하나의 루프에서 폴링합니다.
//!
//! # 동작
//!
//! ```text
//! loop {
//!     for source in [snort, suricata] {
//!         line = tail.next_line()
//!         line 있음 -> parser.parse_line -> notifier.send
//!         line 없음 -> idle pause 한 번
//!     }
//! }
//! ```
//!
//! 단일 태스크에서 각 단계(읽기, 파싱, 전송)를 끝까지 기다린 뒤 다음으로 넘어갑니다.
//! 어떤 에러도 루프를 멈추지 않습니다.

use std::time::Duration;

use idsgram_core::config::MonitorConfig;
use idsgram_core::metrics as m;
use tracing::{debug, info, warn};

use crate::alert::AlertSource;
use crate::collector::{FileTail, TailState};
use crate::error::LogPipelineError;
use crate::notifier::Notifier;
use crate::parser::{AlertParser, SnortParser, SuricataParser};

/// `poll_once` 한 번의 처리 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// 읽은 완성 라인 수
    pub lines: usize,
    /// 알림 메시지로 변환된 라인 수
    pub alerts: usize,
    /// 전송 성공 수
    pub delivered: usize,
    /// 전송 실패 수
    pub failed: usize,
}

/// 감시 대상 하나 (파일 + 파서)
struct Source {
    tail: FileTail,
    parser: Box<dyn AlertParser>,
}

/// Snort/Suricata 로그 모니터
pub struct LogMonitor<N: Notifier> {
    sources: Vec<Source>,
    notifier: N,
    idle_pause: Duration,
    opened: bool,
    warned_all_disabled: bool,
}

impl<N: Notifier> LogMonitor<N> {
    /// 설정에서 모니터를 생성합니다.
    ///
    /// 경로가 빈 소스는 감시하지 않습니다. 파일은 아직 열지 않습니다.
    ///
    /// # Errors
    ///
    /// Snort 패턴 컴파일에 실패하면 에러를 반환합니다.
    pub fn new(config: &MonitorConfig, notifier: N) -> Result<Self, LogPipelineError> {
        let mut sources = Vec::with_capacity(2);

        if config.snort_log_path.is_empty() {
            info!(source = "snort", "log source not configured");
        } else {
            sources.push(Source {
                tail: FileTail::new(&config.snort_log_path, config.max_line_length),
                parser: Box::new(SnortParser::new()?),
            });
        }

        if config.suricata_log_path.is_empty() {
            info!(source = "suricata", "log source not configured");
        } else {
            sources.push(Source {
                tail: FileTail::new(&config.suricata_log_path, config.max_line_length),
                parser: Box::new(SuricataParser::new()),
            });
        }

        Ok(Self {
            sources,
            notifier,
            idle_pause: Duration::from_millis(config.idle_pause_ms),
            opened: false,
            warned_all_disabled: false,
        })
    }

    /// 모든 소스를 열고 파일 끝으로 이동합니다.
    ///
    /// 열 수 없는 소스는 비활성화되며 다시 시도하지 않습니다.
    /// 감시 중인 소스 수를 반환합니다.
    pub async fn open_sources(&mut self) -> usize {
        if !self.opened {
            self.opened = true;
            for source in &mut self.sources {
                let name = source.parser.source();
                match source.tail.open().await {
                    Ok(offset) => info!(
                        source = %name,
                        path = %source.tail.path().display(),
                        offset,
                        "tailing log file"
                    ),
                    Err(e) => warn!(
                        source = %name,
                        error = %e,
                        "log source disabled"
                    ),
                }
            }
        }
        self.active_sources()
    }

    /// 감시 중인(`Tailing`) 소스 수
    pub fn active_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.tail.state() == TailState::Tailing)
            .count()
    }

    /// 소스별 상태
    pub fn source_states(&self) -> Vec<(AlertSource, TailState)> {
        self.sources
            .iter()
            .map(|s| (s.parser.source(), s.tail.state()))
            .collect()
    }

    /// 알림기 참조
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// 폴링 한 번을 수행합니다.
    ///
    /// 각 소스에서 라인을 최대 하나씩 처리하고, 새 라인이 없던 소스마다
    /// idle pause만큼 대기합니다. 감시 중인 소스가 하나도 없으면 한 번 대기합니다.
    pub async fn poll_once(&mut self) -> PollReport {
        self.open_sources().await;

        let mut report = PollReport::default();
        let mut idle = 0u32;
        let mut active = 0usize;

        for source in &mut self.sources {
            if source.tail.state() != TailState::Tailing {
                continue;
            }
            active += 1;
            if !poll_source(source, &self.notifier, &mut report).await {
                idle += 1;
            }
        }

        if active == 0 {
            if !self.warned_all_disabled {
                warn!("no log source is available, monitor is idle");
                self.warned_all_disabled = true;
            }
            idle = 1;
        }

        if idle > 0 {
            tokio::time::sleep(idle_delay(self.idle_pause, idle)).await;
        }

        report
    }

    /// 종료될 때까지 폴링을 반복합니다.
    pub async fn run(&mut self) {
        let active = self.open_sources().await;
        info!(active_sources = active, "log monitor started");

        loop {
            let report = self.poll_once().await;
            if report.lines > 0 {
                debug!(
                    lines = report.lines,
                    alerts = report.alerts,
                    delivered = report.delivered,
                    failed = report.failed,
                    "poll iteration"
                );
            }
        }
    }
}

/// idle 소스 수만큼의 대기 시간. 넘치면 `Duration::MAX`로 고정합니다.
fn idle_delay(pause: Duration, idle_sources: u32) -> Duration {
    pause.saturating_mul(idle_sources)
}

/// 소스 하나에서 라인을 최대 하나 처리합니다. 라인을 소비했으면 `true`.
async fn poll_source<N: Notifier>(
    source: &mut Source,
    notifier: &N,
    report: &mut PollReport,
) -> bool {
    let name = source.parser.source();

    let line = match source.tail.next_line().await {
        Ok(Some(line)) => line,
        Ok(None) => return false,
        Err(e @ LogPipelineError::LineTooLong { .. }) => {
            warn!(source = %name, error = %e, "discarding oversized line");
            metrics::counter!(m::PARSE_ERRORS_TOTAL, m::LABEL_SOURCE => name.as_str()).increment(1);
            return true;
        }
        Err(e) => {
            warn!(source = %name, error = %e, "failed to read log file");
            return false;
        }
    };

    report.lines += 1;
    metrics::counter!(m::LINES_READ_TOTAL, m::LABEL_SOURCE => name.as_str()).increment(1);

    let message = match source.parser.parse_line(&line) {
        Ok(Some(message)) => message,
        Ok(None) => {
            debug!(source = %name, "line is not an alert");
            return true;
        }
        Err(e) => {
            warn!(source = %name, error = %e, "discarding unparseable line");
            metrics::counter!(m::PARSE_ERRORS_TOTAL, m::LABEL_SOURCE => name.as_str()).increment(1);
            return true;
        }
    };

    report.alerts += 1;
    metrics::counter!(m::ALERTS_PARSED_TOTAL, m::LABEL_SOURCE => name.as_str()).increment(1);
    debug!(source = %name, "dispatching alert");

    if notifier.send(&message).await.is_delivered() {
        report.delivered += 1;
    } else {
        report.failed += 1;
    }
    true
}
