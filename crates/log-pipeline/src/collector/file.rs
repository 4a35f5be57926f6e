//! 파일 기반 로그 수집기
//!
//! 로그 파일을 열면 곧바로 파일 끝으로 이동하므로, 시작 이후 추가된 라인만 읽습니다.
//! 읽기 위치는 열린 파일 핸들이 추적하며 앞으로만 움직입니다.
//!
//! # 상태
//! ```text
//! Unopened --open ok--> Tailing
//!     |
//!     +----open fail--> Disabled (재시도 없음)
//! ```
//!
//! 로테이션(inode 변경, truncation)은 감지하지 않습니다.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

use crate::error::LogPipelineError;

/// 파일 소스 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// 아직 열지 않음
    Unopened,
    /// 파일 끝을 따라가는 중
    Tailing,
    /// 열기에 실패해 영구히 제외됨
    Disabled,
}

/// 파일 끝을 따라가며 완성된 라인을 하나씩 돌려주는 수집기
pub struct FileTail {
    /// 파일 경로
    path: PathBuf,
    /// 현재 상태
    state: TailState,
    /// 열린 파일 (Tailing 상태에서만 존재)
    reader: Option<BufReader<File>>,
    /// 아직 개행이 도착하지 않은 라인 조각
    pending: Vec<u8>,
    /// 최대 라인 길이 (바이트)
    max_line_length: usize,
    /// 너무 긴 라인의 나머지를 버리는 중
    skipping: bool,
}

impl FileTail {
    /// 새 수집기를 생성합니다. 파일은 [`open`](Self::open)에서 엽니다.
    pub fn new(path: impl Into<PathBuf>, max_line_length: usize) -> Self {
        Self {
            path: path.into(),
            state: TailState::Unopened,
            reader: None,
            pending: Vec::new(),
            max_line_length,
            skipping: false,
        }
    }

    /// 감시 중인 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 상태
    pub fn state(&self) -> TailState {
        self.state
    }

    /// 파일을 열고 끝으로 이동합니다.
    ///
    /// 성공하면 `Tailing`이 되고 시작 오프셋을 반환합니다.
    /// 실패하면 `Disabled`가 되며 이후 다시 열지 않습니다.
    /// `Unopened`가 아닌 상태에서 호출하면 아무 일도 하지 않습니다.
    pub async fn open(&mut self) -> Result<u64, LogPipelineError> {
        if self.state != TailState::Unopened {
            return Ok(0);
        }

        match Self::open_at_end(&self.path).await {
            Ok((reader, offset)) => {
                self.reader = Some(reader);
                self.state = TailState::Tailing;
                Ok(offset)
            }
            Err(e) => {
                self.state = TailState::Disabled;
                Err(LogPipelineError::SourceUnavailable {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn open_at_end(path: &Path) -> std::io::Result<(BufReader<File>, u64)> {
        let mut file = File::open(path).await?;
        let offset = file.seek(SeekFrom::End(0)).await?;
        Ok((BufReader::new(file), offset))
    }

    /// 완성된 새 라인을 하나 읽습니다.
    ///
    /// - `Ok(Some(line))`: 개행까지 도착한 라인 (개행 문자 제외)
    /// - `Ok(None)`: 새 라인 없음, 또는 `Tailing` 상태가 아님
    /// - `Err(LineTooLong)`: 최대 길이를 넘어 버린 라인
    ///
    /// 버퍼에 들어온 만큼만 조금씩 소비하므로, 라인 조각은 `max_line_length`를
    /// 넘게 쌓이지 않습니다. `LineTooLong`의 `length`는 한도를 넘긴 시점까지 본 길이입니다.
    /// 잘못된 UTF-8은 대체 문자로 바꿉니다.
    pub async fn next_line(&mut self) -> Result<Option<String>, LogPipelineError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                // 아직 개행이 오지 않음
                return Ok(None);
            }

            let newline = available.iter().position(|b| *b == b'\n');
            let complete = newline.is_some();
            let used = newline.map_or(available.len(), |idx| idx + 1);

            if self.skipping {
                // 앞서 버린 긴 라인의 나머지
                reader.consume(used);
                if complete {
                    self.skipping = false;
                    return Ok(None);
                }
                continue;
            }

            let length = self.pending.len() + line_length(&available[..used]);
            if length > self.max_line_length {
                reader.consume(used);
                self.pending.clear();
                self.skipping = !complete;
                return Err(LogPipelineError::LineTooLong {
                    length,
                    max: self.max_line_length,
                });
            }

            self.pending.extend_from_slice(&available[..used]);
            reader.consume(used);

            if complete {
                let raw = std::mem::take(&mut self.pending);
                let line = String::from_utf8_lossy(&raw);
                return Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()));
            }
        }
    }
}

// 개행 문자를 뺀 길이
fn line_length(buf: &[u8]) -> usize {
    let mut len = buf.len();
    while len > 0 && matches!(buf[len - 1], b'\n' | b'\r') {
        len -= 1;
    }
    len
}
